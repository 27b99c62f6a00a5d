//! Campagne moteur : les propriétés observables du noyau, de bout en bout
//! (garde -> normalisation -> évaluation / résolution -> affichage).
//!
//! Notes (aligné avec l'état actuel du noyau) :
//! - L'ordre des racines est celui, déterministe, du moteur : racines
//!   rationnelles défléchies croissantes, puis paire quadratique (branche
//!   "moins" d'abord), puis racines numériques triées.
//! - Les racines doubles sortent UNE fois (le moteur rend les racines
//!   distinctes), ce qui peut changer la famille détectée.
//! - `log` vaut base 10 à l'évaluation et logarithme népérien à la
//!   résolution : divergence assumée entre les deux voies.

use std::collections::HashMap;
use std::time::Duration;

use super::affiche::{formater_racine, formater_resolution, formater_valeur};
use super::erreurs::Erreur;
use super::evalue::{evaluer, evaluer_avec, ValeurNum};
use super::resoud::{resoudre, resoudre_avec_delai, Racine, TypeEquation};
use super::trace::decrire_trace;

fn val(expr: &str) -> ValeurNum {
    evaluer(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_finie(expr: &str, attendu: f64) {
    match val(expr) {
        ValeurNum::Finie(v) => {
            assert!((v - attendu).abs() < 1e-9, "expr={expr:?} v={v} attendu={attendu}")
        }
        autre => panic!("expr={expr:?} : {autre:?}"),
    }
}

/* ------------------------ Table restreinte ------------------------ */

#[test]
fn sci_table_restreinte_seulement() {
    // tout identifiant hors table est rejeté, jamais résolu ailleurs
    for expr in ["foo(2)", "y+1", "system", "rm"] {
        match evaluer(expr) {
            Err(Erreur::SymboleInconnu(_)) | Err(Erreur::Syntaxe(_)) | Err(Erreur::Securite) => {}
            autre => panic!("expr={expr:?} aurait dû être rejetée : {autre:?}"),
        }
    }
}

#[test]
fn sci_garde_court_circuite_tout() {
    for expr in [
        "__import__('os').system('id')",
        "exec('print(1)')",
        "eval(input())",
        "open('/etc/passwd')",
        "2+2; import sys",
    ] {
        assert_eq!(evaluer(expr), Err(Erreur::Securite), "expr={expr:?}");
        assert!(resoudre(&format!("{expr}=0")).en_erreur());
    }
}

/* ------------------------ Évaluation ------------------------ */

#[test]
fn sci_accrochage_entier() {
    assert_eq!(val("4/2"), ValeurNum::Finie(2.0));
    assert_eq!(formater_valeur(&val("4/2")), "2");
    assert_eq!(val("0.1+0.2"), ValeurNum::Finie(0.3));
}

#[test]
fn sci_division_politique_unifiee() {
    // dénominateur littéral nul : erreur; 0/0 littéral : indéfini
    assert_eq!(evaluer("5/0"), Err(Erreur::DivisionParZero));
    assert_eq!(val("0/0"), ValeurNum::Indefinie);
    // zéro seulement calculé : infini signé IEEE
    assert_eq!(val("1/(2-2)"), ValeurNum::InfiniPos);
}

#[test]
fn sci_idempotence() {
    for expr in ["sin(1)+cos(1)", "2^0.5", "ln(7)/log(7)"] {
        assert_eq!(evaluer(expr), evaluer(expr), "expr={expr:?}");
    }
}

#[test]
fn sci_log_base_10_a_l_evaluation() {
    assert_finie("log(1000)", 3.0);
    assert_finie("ln(e^2)", 2.0);
}

#[test]
fn sci_variables_liees() {
    let mut vars = HashMap::new();
    vars.insert("x".to_string(), 3.0);
    assert_eq!(evaluer_avec("x^2+1", &vars), Ok(ValeurNum::Finie(10.0)));
}

/* ------------------------ Résolution ------------------------ */

#[test]
fn sci_lineaire() {
    let r = resoudre("2*x+5=15");
    assert_eq!(r.racines.len(), 1);
    assert_eq!(formater_racine(&r.racines[0]), "5");
    assert_eq!(r.genre, Some(TypeEquation::Lineaire));
}

#[test]
fn sci_quadratique_et_ordre() {
    let r = resoudre("x**2-4=0");
    let rendues: Vec<String> = r.racines.iter().map(formater_racine).collect();
    assert_eq!(rendues, vec!["-2", "2"]);
    assert_eq!(r.genre, Some(TypeEquation::Quadratique));
}

#[test]
fn sci_complexes_avec_note() {
    let r = resoudre("x**2+1=0");
    assert_eq!(r.racines.len(), 2);
    assert!(r.racines.iter().all(Racine::est_complexe));

    let msg = formater_resolution(&r);
    assert!(msg.contains("unité imaginaire"), "message : {msg}");
    assert!(!msg.contains("--"), "double signe : {msg}");
}

#[test]
fn sci_complexes_conjuguees_generales() {
    // x² + x + 1 : -1/2 ± √3i/2
    let r = resoudre("x^2+x+1=0");
    let rendues: Vec<String> = r.racines.iter().map(formater_racine).collect();
    assert_eq!(rendues, vec!["-1/2-√3i/2", "-1/2+√3i/2"]);
}

#[test]
fn sci_contradiction() {
    let r = resoudre("x=x+1");
    assert!(r.en_erreur());
    assert!(r.racines.is_empty());
    assert!(r.erreur.as_deref().unwrap_or("").contains("pas de solution"));
}

#[test]
fn sci_egal_obligatoire() {
    let r = resoudre("x+1");
    assert!(r.en_erreur());
    assert!(r.erreur.as_deref().unwrap_or("").contains("'='"));
}

#[test]
fn sci_priorite_de_classement() {
    // le jeton trig l'emporte sur le comptage de racines
    let r = resoudre("sin(0)+x^2=4");
    assert_eq!(r.genre, Some(TypeEquation::Trigonometrique));

    // exp l'emporte sur log dans l'ordre de priorité
    let r = resoudre("exp(x)+0*log(x)=5");
    assert_eq!(r.genre, Some(TypeEquation::Exponentielle));
}

#[test]
fn sci_delai_rendu_comme_faute() {
    let r = resoudre_avec_delai("sin(x)=0.5", Duration::ZERO);
    assert!(r.en_erreur());
    // un nouvel essai échouera pareil : le diagnostic doit le dire clairement
    assert!(r.erreur.as_deref().unwrap_or("").contains("délai"));
}

#[test]
fn sci_messages_bornes() {
    let interminable = format!("x+{}=0", "1+".repeat(300));
    let r = resoudre(&interminable);
    assert!(r.en_erreur());
    assert!(r.erreur.as_deref().unwrap_or("").chars().count() <= 200);
}

/* ------------------------ Tracé ------------------------ */

#[test]
fn sci_trace_reciprocite() {
    let d = decrire_trace("1/x").unwrap();
    assert_eq!(d.discontinuites, vec![0.0]);
    assert_eq!(d.evaluer_en(0.0), None);
    assert_eq!(d.evaluer_en(4.0), Some(0.25));
}

#[test]
fn sci_trace_polynome_continu() {
    let d = decrire_trace("x^2-1").unwrap();
    assert!(d.est_continue());
    assert_eq!(d.evaluer_en(3.0), Some(8.0));
}

/* ------------------------ Affichage total ------------------------ */

#[test]
fn sci_affichage_ne_panique_jamais() {
    // tout résultat bien formé doit se rendre, y compris ∞ et indéfini
    for expr in ["1/(2-2)", "-1/(2-2)", "0/0", "exp(1000)", "2^0.5"] {
        let v = val(expr);
        let _ = formater_valeur(&v);
    }

    for eq in [
        "x**2+1=0",
        "x^2-2=0",
        "x^3=2",
        "x=x+1",
        "sin(x)=0",
        "pas d'égal",
    ] {
        let r = resoudre(eq);
        let _ = formater_resolution(&r);
    }
}
