// src/noyau/trace.rs
//
// Description d'une fonction d'une variable en vue d'un tracé.
// Le moteur ne dessine rien : il fournit une expression appelable
// assainie, un domaine suggéré et les discontinuités connues; le rendu
// appartient au collaborateur de tracé.
//
// Heuristiques structurelles :
// - un dénominateur contenant x signale une singularité en 0;
// - une tangente sur x signale des pôles périodiques en π/2 + n·π.

use std::f64::consts::PI;

use super::arbre::{Expr, Fonction};
use super::erreurs::Erreur;
use super::garde;
use super::notation::{normaliser, Cible};
use super::resoud::evaluer_point;
use super::syntaxe::analyser;

/// Description prête à tracer.
#[derive(Clone, Debug)]
pub struct DescriptionTrace {
    /// Forme normalisée de la fonction (assainie).
    pub fonction: String,
    /// Arbre appelable (voir `evaluer_en`).
    pub arbre: Expr,
    /// Domaine suggéré.
    pub x_min: f64,
    pub x_max: f64,
    /// Points de rupture connus dans le domaine, croissants.
    pub discontinuites: Vec<f64>,
}

impl DescriptionTrace {
    pub fn est_continue(&self) -> bool {
        self.discontinuites.is_empty()
    }

    /// Évalue la fonction en un point; None si la valeur n'est pas finie
    /// (le traceur saute le point).
    pub fn evaluer_en(&self, x: f64) -> Option<f64> {
        match evaluer_point(&self.arbre, x) {
            Ok(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }
}

/// Analyse une fonction de x et en décrit le tracé.
pub fn decrire_trace(fonction: &str) -> Result<DescriptionTrace, Erreur> {
    garde::verifier(fonction)?;
    let norme = normaliser(fonction, Cible::Resolution);
    garde::verifier(&norme)?;

    let arbre = analyser(&norme, Cible::Resolution)?.simplifier();

    let (x_min, x_max) = domaine_suggere(&norme, &arbre);
    let discontinuites = chercher_discontinuites(&arbre, x_min, x_max);

    log::info!(
        "tracé : {norme} => domaine ({x_min}, {x_max}), {} rupture(s)",
        discontinuites.len()
    );

    Ok(DescriptionTrace {
        fonction: norme,
        arbre,
        x_min,
        x_max,
        discontinuites,
    })
}

/// Domaine adapté à la famille de la fonction.
fn domaine_suggere(texte: &str, arbre: &Expr) -> (f64, f64) {
    if texte.contains("exp") || texte.contains("e^") {
        return (-3.0, 3.0);
    }
    if texte.contains("ln") || texte.contains("log") {
        return (0.1, 5.0);
    }
    if denominateur_avec_var(arbre) {
        return (-5.0, 5.0);
    }
    (-5.0, 5.0)
}

fn chercher_discontinuites(arbre: &Expr, x_min: f64, x_max: f64) -> Vec<f64> {
    let mut points = Vec::new();

    // terme en 1/x : singularité en 0 si le domaine la couvre
    if denominateur_avec_var(arbre) && x_min < 0.0 && 0.0 < x_max {
        points.push(0.0);
    }

    // tangente : pôles en π/2 + n·π
    if tangente_sur_var(arbre) {
        let n_min = ((x_min - PI / 2.0) / PI).ceil() as i64;
        let n_max = ((x_max - PI / 2.0) / PI).floor() as i64;
        for n in n_min..=n_max {
            let pole = PI / 2.0 + n as f64 * PI;
            if x_min < pole && pole < x_max {
                points.push(pole);
            }
        }
    }

    points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    points.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    points
}

/// Une division dont le dénominateur contient la variable ?
fn denominateur_avec_var(e: &Expr) -> bool {
    use Expr::*;
    match e {
        Rat(_) | Pi | E | Var(_) => false,
        Fct(_, x) => denominateur_avec_var(x),
        Div(a, b) => {
            b.contient_var() || denominateur_avec_var(a) || denominateur_avec_var(b)
        }
        Add(a, b) | Sub(a, b) | Mul(a, b) | Pow(a, b) => {
            denominateur_avec_var(a) || denominateur_avec_var(b)
        }
    }
}

/// Une tangente appliquée à la variable ?
fn tangente_sur_var(e: &Expr) -> bool {
    use Expr::*;
    match e {
        Rat(_) | Pi | E | Var(_) => false,
        Fct(Fonction::Tan, x) if x.contient_var() => true,
        Fct(_, x) => tangente_sur_var(x),
        Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => {
            tangente_sur_var(a) || tangente_sur_var(b)
        }
    }
}
