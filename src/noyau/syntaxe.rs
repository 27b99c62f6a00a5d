// src/noyau/syntaxe.rs
//
// Shunting-yard -> RPN -> Arbre
// Objectif :
// - Convertir une suite de Tok en notation postfixée
// - Puis reconstruire Expr
//
// Règles :
// - Ident(nom) :
//    - si nom est dans la table des fonctions => fonction unaire
//    - sinon => variable (Expr::Var)
// - Moins préfixe :
//    - si '-' arrive quand on n'attend PAS une valeur, il devient l'opérateur
//      unaire Neg (préfixe, priorité entre '*' et '^'), rendu en Sub(0, x)
//      dans l'arbre. "2^-1" donne bien 2^(-1), "2*-3" donne bien -6.
//
// NOTE :
// - Les fonctions sont traitées comme des opérateurs "collés" à leur argument
//   et sortent après la parenthèse fermante.

use super::arbre::{Expr, Fonction};
use super::erreurs::Erreur;
use super::jetons::{inserer_mult_implicite, tokenize, Tok};
use super::notation::Cible;

/// Élément de la notation postfixée.
#[derive(Clone, Debug, PartialEq)]
enum Rpn {
    Valeur(Tok), // Num, Pi, E ou Ident-variable
    Fct(Fonction),
    Op(Op),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Op {
    Plus,
    Moins,
    Fois,
    Division,
    Neg,
    Puissance,
}

fn priorite(op: Op) -> i32 {
    match op {
        Op::Plus | Op::Moins => 1,
        Op::Fois | Op::Division => 2,
        Op::Neg => 3,
        Op::Puissance => 4,
    }
}

fn associatif_droite(op: Op) -> bool {
    matches!(op, Op::Puissance | Op::Neg)
}

/// Pile d'opérateurs en attente.
#[derive(Clone, Debug)]
enum Attente {
    Op(Op),
    Fct(Fonction),
    Parenthese,
}

/// Analyse complète : chaîne normalisée -> arbre.
/// Pour la cible Résolution (et le tracé), la multiplication implicite est
/// insérée entre la tokenisation et l'analyse syntaxique.
pub fn analyser(texte: &str, cible: Cible) -> Result<Expr, Erreur> {
    let mut jetons = tokenize(texte)?;
    if jetons.is_empty() {
        return Err(Erreur::Syntaxe("entrée vide".into()));
    }
    if cible == Cible::Resolution {
        jetons = inserer_mult_implicite(jetons);
    }
    let rpn = vers_rpn(&jetons)?;
    construire(&rpn)
}

/// Convertit une suite de jetons en notation postfixée.
fn vers_rpn(jetons: &[Tok]) -> Result<Vec<Rpn>, Erreur> {
    let mut out: Vec<Rpn> = Vec::new();
    let mut pile: Vec<Attente> = Vec::new();

    // "valeur" = un atome ou une expression fermée.
    // Sert à distinguer le moins binaire du moins préfixe.
    let mut prec_etait_valeur = false;

    for tok in jetons.iter().cloned() {
        match tok {
            Tok::Num(_) | Tok::Pi | Tok::E => {
                out.push(Rpn::Valeur(tok));
                prec_etait_valeur = true;
            }

            Tok::Ident(nom) => {
                if let Some(f) = Fonction::depuis_nom(&nom) {
                    // fonction : reste sur la pile, sortira après son argument
                    pile.push(Attente::Fct(f));
                    prec_etait_valeur = false;
                } else {
                    out.push(Rpn::Valeur(Tok::Ident(nom)));
                    prec_etait_valeur = true;
                }
            }

            Tok::LPar => {
                pile.push(Attente::Parenthese);
                prec_etait_valeur = false;
            }

            Tok::RPar => {
                // dépile jusqu'à '('
                loop {
                    match pile.pop() {
                        Some(Attente::Parenthese) => break,
                        Some(Attente::Op(op)) => out.push(Rpn::Op(op)),
                        Some(Attente::Fct(f)) => out.push(Rpn::Fct(f)),
                        None => {
                            return Err(Erreur::Syntaxe("parenthèse fermante isolée".into()))
                        }
                    }
                }

                // si une fonction précède la parenthèse, elle sort aussi
                if let Some(Attente::Fct(_)) = pile.last() {
                    if let Some(Attente::Fct(f)) = pile.pop() {
                        out.push(Rpn::Fct(f));
                    }
                }

                prec_etait_valeur = true;
            }

            Tok::Plus | Tok::Star | Tok::Slash | Tok::Caret | Tok::Minus => {
                let op = match tok {
                    Tok::Plus => Op::Plus,
                    Tok::Star => Op::Fois,
                    Tok::Slash => Op::Division,
                    Tok::Caret => Op::Puissance,
                    Tok::Minus if prec_etait_valeur => Op::Moins,
                    Tok::Minus => Op::Neg,
                    _ => unreachable!(),
                };

                // opérateur préfixe : ne dépile rien, ses opérandes suivent
                if op != Op::Neg {
                    depiler_selon_priorite(&mut pile, &mut out, op);
                }

                pile.push(Attente::Op(op));
                prec_etait_valeur = false;
            }
        }
    }

    // vide la pile
    while let Some(a) = pile.pop() {
        match a {
            Attente::Parenthese => {
                return Err(Erreur::Syntaxe("parenthèses non fermées".into()))
            }
            Attente::Op(op) => out.push(Rpn::Op(op)),
            Attente::Fct(f) => out.push(Rpn::Fct(f)),
        }
    }

    Ok(out)
}

/// Dépile tant que :
/// - on n'est pas bloqué par '('
/// - on ne traverse pas une fonction (elle reste collée à son argument)
/// - la priorité/associativité exige de sortir l'opérateur du haut
fn depiler_selon_priorite(pile: &mut Vec<Attente>, out: &mut Vec<Rpn>, op: Op) {
    while let Some(haut) = pile.last() {
        let p_haut = match haut {
            Attente::Parenthese | Attente::Fct(_) => break,
            Attente::Op(o) => priorite(*o),
        };

        let p_op = priorite(op);
        let doit_sortir = if associatif_droite(op) {
            p_haut > p_op
        } else {
            p_haut >= p_op
        };

        if !doit_sortir {
            break;
        }
        if let Some(Attente::Op(o)) = pile.pop() {
            out.push(Rpn::Op(o));
        }
    }
}

/// Construit une Expr à partir de la notation postfixée.
fn construire(rpn: &[Rpn]) -> Result<Expr, Erreur> {
    let mut pile: Vec<Expr> = Vec::new();

    for el in rpn.iter().cloned() {
        match el {
            Rpn::Valeur(Tok::Num(r)) => pile.push(Expr::Rat(r)),
            Rpn::Valeur(Tok::Pi) => pile.push(Expr::Pi),
            Rpn::Valeur(Tok::E) => pile.push(Expr::E),
            Rpn::Valeur(Tok::Ident(nom)) => pile.push(Expr::Var(nom)),
            Rpn::Valeur(_) => return Err(Erreur::Syntaxe("jeton inattendu".into())),

            Rpn::Fct(f) => {
                let x = pile
                    .pop()
                    .ok_or_else(|| Erreur::Syntaxe("fonction sans argument".into()))?;
                pile.push(Expr::Fct(f, Box::new(x)));
            }

            Rpn::Op(Op::Neg) => {
                let x = pile
                    .pop()
                    .ok_or_else(|| Erreur::Syntaxe("expression invalide".into()))?;
                pile.push(Expr::Sub(Box::new(Expr::entier(0)), Box::new(x)));
            }

            Rpn::Op(op) => {
                let b = pile
                    .pop()
                    .ok_or_else(|| Erreur::Syntaxe("expression invalide".into()))?;
                let a = pile
                    .pop()
                    .ok_or_else(|| Erreur::Syntaxe("expression invalide".into()))?;

                let e = match op {
                    Op::Plus => Expr::Add(Box::new(a), Box::new(b)),
                    Op::Moins => Expr::Sub(Box::new(a), Box::new(b)),
                    Op::Fois => Expr::Mul(Box::new(a), Box::new(b)),
                    Op::Division => Expr::Div(Box::new(a), Box::new(b)),
                    Op::Puissance => Expr::Pow(Box::new(a), Box::new(b)),
                    Op::Neg => unreachable!(),
                };
                pile.push(e);
            }
        }
    }

    if pile.len() != 1 {
        return Err(Erreur::Syntaxe("expression invalide".into()));
    }
    pile.pop()
        .ok_or_else(|| Erreur::Syntaxe("expression invalide".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arbre(s: &str) -> Expr {
        analyser(s, Cible::Evaluation).unwrap_or_else(|e| panic!("analyse de {s:?} : {e}"))
    }

    #[test]
    fn priorites_usuelles() {
        assert_eq!(arbre("2+3*4").to_string(), "(2+(3*4))");
        assert_eq!(arbre("(2+3)*4").to_string(), "((2+3)*4)");
    }

    #[test]
    fn puissance_associative_droite() {
        assert_eq!(arbre("2^3^2").to_string(), "(2^(3^2))");
    }

    #[test]
    fn moins_prefixe() {
        assert_eq!(arbre("-x").to_string(), "(0-x)");
        // le préfixe se lie plus fort que '*' mais moins fort que '^'
        assert_eq!(arbre("2*-3").to_string(), "(2*(0-3))");
        assert_eq!(arbre("2^-1").to_string(), "(2^(0-1))");
        assert_eq!(arbre("-2^2").to_string(), "(0-(2^2))");
    }

    #[test]
    fn fonction_collee_a_son_argument() {
        assert_eq!(arbre("sin(pi/2)").to_string(), "sin((pi/2))");
        assert_eq!(arbre("2*sqrt(9)+1").to_string(), "((2*sqrt(9))+1)");
    }

    #[test]
    fn erreurs_de_grammaire() {
        assert!(analyser("(2+3", Cible::Evaluation).is_err());
        assert!(analyser("2+", Cible::Evaluation).is_err());
        assert!(analyser(")", Cible::Evaluation).is_err());
        assert!(analyser("", Cible::Evaluation).is_err());
        assert!(analyser("sin()", Cible::Evaluation).is_err());
    }

    #[test]
    fn mult_implicite_pour_la_resolution() {
        assert_eq!(
            analyser("2x+1", Cible::Resolution).unwrap().to_string(),
            "((2*x)+1)"
        );
    }
}
