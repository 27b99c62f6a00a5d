// src/noyau/evalue.rs
//
// Évaluation numérique d'une expression sous table restreinte.
//
// Pipeline : garde -> normalisation -> garde -> jetons -> syntaxe -> arbre
//         -> interprétation f64 -> post-traitement (∞ / indéfini / accrochage
//            entier / arrondi à 10 décimales).
//
// Politique de division :
// - dénominateur LITTÉRALEMENT nul (écrit `0` dans la source) :
//     * `0/0` littéral -> indéfini
//     * sinon -> erreur DivisionParZero
// - dénominateur qui ne fait que S'ÉVALUER à zéro : sémantique IEEE-754
//   (infini signé, ou NaN -> indéfini). Un débordement vers l'infini d'une
//   routine de bibliothèque (exp(1000), ...) suit la même voie.

use std::collections::HashMap;
use std::f64::consts;

use num_traits::{ToPrimitive, Zero};

use super::arbre::{Expr, Fonction};
use super::erreurs::Erreur;
use super::garde;
use super::notation::{normaliser, Cible};
use super::syntaxe::analyser;

/// Résultat numérique présentable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValeurNum {
    Finie(f64),
    InfiniPos,
    InfiniNeg,
    Indefinie,
}

/// Évalue une expression sans variable liée.
pub fn evaluer(texte: &str) -> Result<ValeurNum, Erreur> {
    evaluer_avec(texte, &HashMap::new())
}

/// Évalue une expression avec un environnement de variables.
/// Fonction pure de (texte, vars) : deux appels identiques rendent des
/// résultats bit à bit identiques.
pub fn evaluer_avec(texte: &str, vars: &HashMap<String, f64>) -> Result<ValeurNum, Erreur> {
    garde::verifier(texte)?;
    let norme = normaliser(texte, Cible::Evaluation);
    // la normalisation ne doit pas pouvoir introduire un contournement
    garde::verifier(&norme)?;

    let arbre = analyser(&norme, Cible::Evaluation)?;
    let brut = eval_f64(&arbre, vars)?;
    let valeur = post_traiter(brut);

    log::info!("évaluation : {norme} => {valeur:?}");
    Ok(valeur)
}

/// Interprétation directe de l'arbre. Seuls les noms de la table restreinte
/// (et les variables de `vars`) se résolvent; tout autre identifiant est une
/// erreur SymboleInconnu.
pub(crate) fn eval_f64(e: &Expr, vars: &HashMap<String, f64>) -> Result<f64, Erreur> {
    use Expr::*;

    match e {
        Rat(r) => r
            .to_f64()
            .ok_or_else(|| Erreur::Evaluation("nombre hors gamme".into())),
        Pi => Ok(consts::PI),
        E => Ok(consts::E),

        Var(nom) => vars
            .get(nom)
            .copied()
            .ok_or_else(|| Erreur::SymboleInconnu(nom.clone())),

        Fct(f, x) => {
            let v = eval_f64(x, vars)?;
            Ok(match f {
                Fonction::Sin => v.sin(),
                Fonction::Cos => v.cos(),
                Fonction::Tan => v.tan(),
                Fonction::Sqrt => v.sqrt(),
                Fonction::Log => v.log10(),
                Fonction::Ln => v.ln(),
                Fonction::Exp => v.exp(),
                Fonction::Abs => v.abs(),
            })
        }

        Add(a, b) => Ok(eval_f64(a, vars)? + eval_f64(b, vars)?),
        Sub(a, b) => Ok(eval_f64(a, vars)? - eval_f64(b, vars)?),
        Mul(a, b) => Ok(eval_f64(a, vars)? * eval_f64(b, vars)?),

        Div(a, b) => {
            // dénominateur littéralement nul : tranché structurellement,
            // avant toute évaluation
            if matches!(&**b, Rat(r) if r.is_zero()) {
                if matches!(&**a, Rat(r) if r.is_zero()) {
                    return Ok(f64::NAN);
                }
                return Err(Erreur::DivisionParZero);
            }
            Ok(eval_f64(a, vars)? / eval_f64(b, vars)?)
        }

        Pow(a, b) => {
            let va = eval_f64(a, vars)?;
            let vb = eval_f64(b, vars)?;
            if vb.fract() == 0.0 && vb.abs() <= 64.0 {
                Ok(va.powi(vb as i32))
            } else {
                Ok(va.powf(vb))
            }
        }
    }
}

/// Post-traitement du flottant brut :
/// - NaN -> Indefinie, ±∞ -> marqueurs signés
/// - accrochage à l'entier le plus proche sous 1e-10
/// - sinon arrondi à 10 décimales
pub(crate) fn post_traiter(v: f64) -> ValeurNum {
    if v.is_nan() {
        return ValeurNum::Indefinie;
    }
    if v.is_infinite() {
        return if v > 0.0 {
            ValeurNum::InfiniPos
        } else {
            ValeurNum::InfiniNeg
        };
    }

    let proche = v.round();
    if (v - proche).abs() < 1e-10 {
        return ValeurNum::Finie(proche);
    }

    // au-delà, l'arrondi décimal déborderait
    if v.abs() < 1e15 {
        return ValeurNum::Finie((v * 1e10).round() / 1e10);
    }
    ValeurNum::Finie(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(s: &str) -> ValeurNum {
        evaluer(s).unwrap_or_else(|e| panic!("evaluer({s:?}) : {e}"))
    }

    #[test]
    fn arithmetique_simple() {
        assert_eq!(ok("2+2"), ValeurNum::Finie(4.0));
        assert_eq!(ok("2+3*4"), ValeurNum::Finie(14.0));
        assert_eq!(ok("(2+3)*4"), ValeurNum::Finie(20.0));
    }

    #[test]
    fn accrochage_entier() {
        // 4/2 rend l'entier 2, pas 2.0000000001
        assert_eq!(ok("4/2"), ValeurNum::Finie(2.0));
        assert_eq!(ok("sqrt(9)"), ValeurNum::Finie(3.0));
        assert_eq!(ok("2^10"), ValeurNum::Finie(1024.0));
    }

    #[test]
    fn division_litterale_par_zero() {
        assert_eq!(evaluer("5/0"), Err(Erreur::DivisionParZero));
        assert_eq!(ok("0/0"), ValeurNum::Indefinie);
    }

    #[test]
    fn division_calculee_par_zero_suit_ieee() {
        assert_eq!(ok("1/(1-1)"), ValeurNum::InfiniPos);
        assert_eq!(ok("-1/(1-1)"), ValeurNum::InfiniNeg);
    }

    #[test]
    fn debordement_vers_infini() {
        assert_eq!(ok("exp(1000)"), ValeurNum::InfiniPos);
    }

    #[test]
    fn fonctions_de_la_table() {
        assert_eq!(ok("log(100)"), ValeurNum::Finie(2.0));
        assert_eq!(ok("ln(e)"), ValeurNum::Finie(1.0));
        assert_eq!(ok("abs(-7)"), ValeurNum::Finie(7.0));
        assert_eq!(ok("cos(0)"), ValeurNum::Finie(1.0));
        assert_eq!(ok("sin(pi/6)"), ValeurNum::Finie(0.5));
    }

    #[test]
    fn racine_negative_indefinie() {
        assert_eq!(ok("sqrt(-1)"), ValeurNum::Indefinie);
        assert_eq!(ok("ln(-1)"), ValeurNum::Indefinie);
    }

    #[test]
    fn notation_informelle() {
        assert_eq!(ok("2 × 3"), ValeurNum::Finie(6.0));
        assert_eq!(ok("6 ÷ 2"), ValeurNum::Finie(3.0));
        assert_eq!(ok("√9"), ValeurNum::Finie(3.0));
        assert_eq!(ok("2**3"), ValeurNum::Finie(8.0));
    }

    #[test]
    fn variables_liees_seulement() {
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), 2.0);
        assert_eq!(evaluer_avec("x+1", &vars), Ok(ValeurNum::Finie(3.0)));
        assert_eq!(
            evaluer_avec("y+1", &vars),
            Err(Erreur::SymboleInconnu("y".into()))
        );
    }

    #[test]
    fn idempotence() {
        let a = evaluer("sin(1)+cos(2)^2");
        let b = evaluer("sin(1)+cos(2)^2");
        assert_eq!(a, b);
    }

    #[test]
    fn garde_appliquee() {
        assert_eq!(evaluer("__import__('os')"), Err(Erreur::Securite));
    }
}
