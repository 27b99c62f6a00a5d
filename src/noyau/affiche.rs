// src/noyau/affiche.rs
//
// Mise en forme des résultats pour l'affichage conversationnel.
//
// Les racines sont rendues depuis leur forme STRUCTURÉE (rationnel, surde,
// complexe) : aucun post-traitement de chaîne sérialisée, donc jamais de
// double signe "--" possible. Conventions de rendu des radicaux : √2, 3√2,
// √2/2, p√n/q, héritées de l'affichage exact du noyau.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::evalue::ValeurNum;
use super::notation::{normaliser, Cible};
use super::resoud::{Racine, ResultatEquation};

/* ------------------------ Valeurs numériques ------------------------ */

/// Rend une valeur numérique : entier sans point décimal, décimales sans
/// zéros de queue, infinis signés, indéfini.
pub fn formater_valeur(v: &ValeurNum) -> String {
    match v {
        ValeurNum::Finie(x) => formater_fini(*x, 10),
        ValeurNum::InfiniPos => "∞".to_string(),
        ValeurNum::InfiniNeg => "-∞".to_string(),
        ValeurNum::Indefinie => "indéfini".to_string(),
    }
}

fn formater_fini(x: f64, decimales: usize) -> String {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        return format!("{}", x as i64);
    }
    let s = format!("{x:.decimales$}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Rendu court (6 décimales) pour les racines approchées.
fn formater_nombre(x: f64) -> String {
    formater_fini(x, 6)
}

/* ------------------------ Racines ------------------------ */

/// Rend une racine structurée. Les complexes sortent toujours sous la forme
/// normalisée a+bi / a-bi.
pub fn formater_racine(r: &Racine) -> String {
    match r {
        Racine::Rationnelle(q) => formater_rationnel(q),

        Racine::Surde { q, c, n } => {
            let radical = ecrire_radical(&c.abs(), n, false);
            if q.is_zero() {
                if c.is_negative() {
                    format!("-{radical}")
                } else {
                    radical
                }
            } else {
                let signe = if c.is_negative() { '-' } else { '+' };
                format!("{}{signe}{radical}", formater_rationnel(q))
            }
        }

        Racine::Complexe { re, c, n } => {
            let imaginaire = ecrire_radical(&c.abs(), n, true);
            if re.is_zero() {
                if c.is_negative() {
                    format!("-{imaginaire}")
                } else {
                    imaginaire
                }
            } else {
                let signe = if c.is_negative() { '-' } else { '+' };
                format!("{}{signe}{imaginaire}", formater_rationnel(re))
            }
        }

        Racine::Approchee(v) => formater_nombre(*v),

        Racine::ApprocheeComplexe { re, im } => {
            let mag = formater_nombre(im.abs());
            let imaginaire = if mag == "1" {
                "i".to_string()
            } else {
                format!("{mag}i")
            };
            if *re == 0.0 {
                if *im < 0.0 {
                    format!("-{imaginaire}")
                } else {
                    imaginaire
                }
            } else {
                let signe = if *im < 0.0 { '-' } else { '+' };
                format!("{}{signe}{imaginaire}", formater_nombre(*re))
            }
        }
    }
}

fn formater_rationnel(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/// (p/q)·√n -> p√n/q ; √n/q si p=1 ; la marque imaginaire "i" se glisse
/// entre le radical et le dénominateur (√3i/2).
/// Précondition : coefficient positif (le signe est géré par l'appelant).
fn ecrire_radical(coeff: &BigRational, n: &BigInt, imaginaire: bool) -> String {
    let p = coeff.numer();
    let q = coeff.denom();

    let mut tete = if n.is_one() {
        if p.is_one() && imaginaire {
            String::new()
        } else {
            format!("{p}")
        }
    } else if p.is_one() {
        format!("√{n}")
    } else {
        format!("{p}√{n}")
    };

    if imaginaire {
        tete.push('i');
    }
    if !q.is_one() {
        tete.push('/');
        tete.push_str(&q.to_string());
    }
    tete
}

/* ------------------------ Équations ------------------------ */

/// Réécrit une équation avec les glyphes usuels : exposants ² et ³
/// (les autres gardent ^), ×, ÷, √, π, e^, et `log` affiché `ln`.
pub fn formater_equation(equation: &str) -> String {
    let e = normaliser(equation, Cible::Affichage);
    let e = superscrire(&e);
    let e = e.replace('*', "×").replace('/', "÷");
    let e = e.replace("sqrt", "√").replace("pi", "π");
    e.replace("exp", "e^").replace("log", "ln")
}

/// ^2 et ^3 deviennent ² et ³ seulement quand l'exposant s'arrête là.
fn superscrire(texte: &str) -> String {
    let chars: Vec<char> = texte.chars().collect();
    let mut out = String::with_capacity(texte.len());
    let mut i = 0;

    while i < chars.len() {
        let exposant_simple = chars[i] == '^'
            && i + 1 < chars.len()
            && (chars[i + 1] == '2' || chars[i + 1] == '3')
            && (i + 2 == chars.len() || !chars[i + 2].is_ascii_digit());

        if exposant_simple {
            out.push(if chars[i + 1] == '2' { '²' } else { '³' });
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/* ------------------------ Messages complets ------------------------ */

/// Message conversationnel pour un calcul.
pub fn formater_calcul(expression: &str, valeur: &ValeurNum) -> String {
    format!(
        "Expression : {}\n\nRésultat : {}",
        formater_equation(expression),
        formater_valeur(valeur)
    )
}

/// Message conversationnel complet pour une résolution : équation, racines
/// numérotées, famille, et note sur l'unité imaginaire si besoin.
/// Ne panique jamais, y compris sur un résultat en erreur.
pub fn formater_resolution(resultat: &ResultatEquation) -> String {
    if let Some(diagnostic) = &resultat.erreur {
        return diagnostic.clone();
    }

    let mut texte = format!("Équation : {}\n\n", formater_equation(&resultat.equation));

    match resultat.racines.len() {
        1 => {
            texte.push_str("Solution trouvée :\n\n");
            texte.push_str(&format!("x = {}\n", formater_racine(&resultat.racines[0])));
        }
        n => {
            texte.push_str(&format!("{n} solutions trouvées :\n\n"));
            for (i, racine) in resultat.racines.iter().enumerate() {
                texte.push_str(&format!("x{} = {}\n", i + 1, formater_racine(racine)));
            }
        }
    }

    if let Some(genre) = resultat.genre {
        texte.push_str(&format!("\nType : {genre}"));
    }

    if resultat.racines.iter().any(|r| r.est_complexe()) {
        texte.push_str("\n\nRemarque : i désigne l'unité imaginaire (√-1)");
    }

    texte
}
