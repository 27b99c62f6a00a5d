// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;

use super::arbre::Fonction;
use super::erreurs::Erreur;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,
    E,

    // Fonctions + variables (tout ce qui n'est pas constante / opérateur / nombre)
    // NOTE: l'analyse syntaxique décidera si c'est une fonction (sin/cos/...)
    // ou une variable.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^

    LPar,
    RPar,
}

/// Tokenize une chaîne normalisée (ASCII canonique) en jetons.
/// Supporte :
/// - entiers et décimaux (ex: 12, 3.14, .5) -> rationnels exacts
/// - opérateurs + - * / ^
/// - parenthèses ( )
/// - identifiants [a-zA-Z_]+ (normalisés en minuscules);
///   "pi" et "e" deviennent les constantes dédiées
pub fn tokenize(s: &str) -> Result<Vec<Tok>, Erreur> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                out.push(Tok::Star);
                i += 1;
                continue;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            '^' => {
                out.push(Tok::Caret);
                i += 1;
                continue;
            }
            _ => {}
        }

        // Identifiants : [a-zA-Z_]+ (les chiffres n'en font pas partie :
        // "sqrt9" se lit sqrt puis 9, et l'analyse attache l'argument)
        if c.is_ascii_alphabetic() || c == '_' {
            let debut = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '_') {
                i += 1;
            }
            let mot: String = chars[debut..i].iter().collect();
            let m = mot.to_lowercase();

            match m.as_str() {
                "pi" => out.push(Tok::Pi),
                "e" => out.push(Tok::E),
                _ => out.push(Tok::Ident(m)),
            }
            continue;
        }

        // Nombre : entier ou décimal (3, 3.14, .5)
        if c.is_ascii_digit() || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit())
        {
            let debut = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }

            let mut frac_len: usize = 0;
            if i < chars.len()
                && chars[i] == '.'
                && i + 1 < chars.len()
                && chars[i + 1].is_ascii_digit()
            {
                i += 1;
                let debut_frac = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                frac_len = i - debut_frac;
            }

            let brut: String = chars[debut..i].iter().filter(|c| **c != '.').collect();
            let n = BigInt::parse_bytes(brut.as_bytes(), 10)
                .ok_or_else(|| Erreur::Syntaxe("nombre invalide".into()))?;
            let d = BigInt::from(10u32).pow(frac_len as u32);

            out.push(Tok::Num(BigRational::new(n, d)));
            continue;
        }

        return Err(Erreur::Syntaxe(format!("caractère inattendu : '{c}'")));
    }

    Ok(out)
}

/* ------------------------ Multiplication implicite ------------------------ */

/// Insère les `*` implicites entre jetons juxtaposés (cible Résolution).
///
/// Deux étapes, dans cet ordre :
/// 1. les identifiants multi-lettres qui ne sont PAS des noms de fonctions
///    sont éclatés en produit de variables à une lettre (xy -> x*y) : la
///    reconnaissance des fonctions a déjà eu lieu pendant la tokenisation,
///    donc `sin` ne peut jamais se fragmenter;
/// 2. un `*` est inséré entre chaque fin de valeur (nombre, constante,
///    parenthèse fermante, variable) et chaque début de valeur (nombre,
///    constante, parenthèse ouvrante, identifiant).
pub fn inserer_mult_implicite(jetons: Vec<Tok>) -> Vec<Tok> {
    // 1) éclatement des identifiants inconnus multi-lettres
    let mut eclates: Vec<Tok> = Vec::with_capacity(jetons.len());
    for t in jetons {
        match &t {
            Tok::Ident(nom) if Fonction::depuis_nom(nom).is_none() && nom.chars().count() > 1 => {
                for c in nom.chars() {
                    if c == 'e' {
                        eclates.push(Tok::E);
                    } else {
                        eclates.push(Tok::Ident(c.to_string()));
                    }
                }
            }
            _ => eclates.push(t),
        }
    }

    // 2) insertion des étoiles
    let mut out: Vec<Tok> = Vec::with_capacity(eclates.len() * 2);
    for t in eclates {
        if let Some(prec) = out.last() {
            if fin_de_valeur(prec) && debut_de_valeur(&t) {
                out.push(Tok::Star);
            }
        }
        out.push(t);
    }
    out
}

/// Le jeton peut-il clore une valeur ? (les fonctions, non : elles attendent
/// leur argument)
fn fin_de_valeur(t: &Tok) -> bool {
    match t {
        Tok::Num(_) | Tok::Pi | Tok::E | Tok::RPar => true,
        Tok::Ident(nom) => Fonction::depuis_nom(nom).is_none(),
        _ => false,
    }
}

fn debut_de_valeur(t: &Tok) -> bool {
    matches!(t, Tok::Num(_) | Tok::Pi | Tok::E | Tok::LPar | Tok::Ident(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendu(jetons: &[Tok]) -> String {
        jetons
            .iter()
            .map(|t| match t {
                Tok::Num(r) => r.to_string(),
                Tok::Pi => "pi".into(),
                Tok::E => "e".into(),
                Tok::Ident(s) => s.clone(),
                Tok::Plus => "+".into(),
                Tok::Minus => "-".into(),
                Tok::Star => "*".into(),
                Tok::Slash => "/".into(),
                Tok::Caret => "^".into(),
                Tok::LPar => "(".into(),
                Tok::RPar => ")".into(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn decimaux_exacts() {
        let j = tokenize("3.14").unwrap();
        assert_eq!(
            j,
            vec![Tok::Num(BigRational::new(BigInt::from(157), BigInt::from(50)))]
        );
        assert!(tokenize(".5").is_ok());
    }

    #[test]
    fn constantes_reconnues() {
        assert_eq!(tokenize("pi").unwrap(), vec![Tok::Pi]);
        assert_eq!(tokenize("E").unwrap(), vec![Tok::E]);
    }

    #[test]
    fn caractere_inconnu_rejete() {
        assert!(matches!(tokenize("2$3"), Err(Erreur::Syntaxe(_))));
    }

    #[test]
    fn mult_implicite_nombre_variable() {
        let j = inserer_mult_implicite(tokenize("2x").unwrap());
        assert_eq!(rendu(&j), "2 * x");
    }

    #[test]
    fn mult_implicite_ne_touche_pas_les_fonctions() {
        let j = inserer_mult_implicite(tokenize("sin(x)").unwrap());
        assert_eq!(rendu(&j), "sin ( x )");

        let j = inserer_mult_implicite(tokenize("2sin(x)").unwrap());
        assert_eq!(rendu(&j), "2 * sin ( x )");
    }

    #[test]
    fn mult_implicite_eclate_les_mots_inconnus() {
        let j = inserer_mult_implicite(tokenize("xy").unwrap());
        assert_eq!(rendu(&j), "x * y");

        let j = inserer_mult_implicite(tokenize("x2").unwrap());
        assert_eq!(rendu(&j), "x * 2");
    }

    #[test]
    fn mult_implicite_parentheses() {
        let j = inserer_mult_implicite(tokenize("2(x+1)(x-1)").unwrap());
        assert_eq!(rendu(&j), "2 * ( x + 1 ) * ( x - 1 )");
    }
}
