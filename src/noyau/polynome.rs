// src/noyau/polynome.rs
//
// Polynômes exacts en x, coefficients rationnels.
// Représentation : Vec<BigRational>, l'indice est le degré (coeffs[0] est le
// terme constant). Les zéros de tête (degrés hauts) sont toujours élagués.
//
// L'extraction depuis l'arbre refuse tout ce qui n'est pas polynomial
// (fonctions, constantes transcendantes, exposant non entier, division par
// une expression contenant x) : le solveur bascule alors sur la voie
// numérique.

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::arbre::{entier_i64, Expr};

/// Degré maximal accepté à l'extraction. Au-delà, la forme est traitée comme
/// non polynomiale (voie numérique).
pub const DEGRE_MAX: usize = 64;

/// Tente d'écrire `e` comme polynôme en x.
/// Retourne None si la forme n'est pas polynomiale (ou dépasse DEGRE_MAX).
pub fn coefficients(e: &Expr) -> Option<Vec<BigRational>> {
    use Expr::*;

    let poly = match e {
        Rat(r) => vec![r.clone()],

        // π et e resteraient symboliques dans les coefficients : hors
        // domaine, la voie numérique s'en charge
        Pi | E => return None,

        Var(nom) => {
            if nom == "x" {
                vec![BigRational::zero(), BigRational::one()]
            } else {
                return None;
            }
        }

        Fct(_, _) => return None,

        Add(a, b) => somme(&coefficients(a)?, &coefficients(b)?),
        Sub(a, b) => difference(&coefficients(a)?, &coefficients(b)?),
        Mul(a, b) => produit(&coefficients(a)?, &coefficients(b)?)?,

        Div(a, b) => {
            let num = coefficients(a)?;
            let den = coefficients(b)?;
            // seule la division par une constante non nulle reste polynomiale
            if den.len() != 1 || den[0].is_zero() {
                return None;
            }
            num.into_iter().map(|c| c / &den[0]).collect()
        }

        Pow(base, exp) => {
            let n = match &**exp {
                Rat(r) if r.denom().is_one() && !r.is_negative() => {
                    entier_i64(r.numer()).filter(|n| *n as usize <= DEGRE_MAX)?
                }
                _ => return None,
            };
            let b = coefficients(base)?;
            let mut acc = vec![BigRational::one()];
            for _ in 0..n {
                acc = produit(&acc, &b)?;
            }
            acc
        }
    };

    Some(elaguer(poly))
}

/// Degré du polynôme (0 pour un polynôme constant ou nul).
pub fn degre(coeffs: &[BigRational]) -> usize {
    coeffs.len().saturating_sub(1)
}

/// Évaluation exacte par Horner.
pub fn evaluer_en(coeffs: &[BigRational], x: &BigRational) -> BigRational {
    let mut acc = BigRational::zero();
    for c in coeffs.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

/// Division synthétique par (x - r). Retourne le quotient si le reste est
/// nul, None sinon (r n'est pas racine).
pub fn deflater(coeffs: &[BigRational], r: &BigRational) -> Option<Vec<BigRational>> {
    if coeffs.len() < 2 {
        return None;
    }

    let mut quotient = vec![BigRational::zero(); coeffs.len() - 1];
    let mut report = BigRational::zero();

    for (i, c) in coeffs.iter().enumerate().rev() {
        let valeur = c + &report * r;
        if i == 0 {
            if !valeur.is_zero() {
                return None; // reste non nul
            }
        } else {
            quotient[i - 1] = valeur.clone();
            report = valeur;
        }
    }

    Some(elaguer(quotient))
}

/* ------------------------ opérations internes ------------------------ */

fn somme(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    let mut out = vec![BigRational::zero(); a.len().max(b.len())];
    for (i, c) in a.iter().enumerate() {
        out[i] += c;
    }
    for (i, c) in b.iter().enumerate() {
        out[i] += c;
    }
    out
}

fn difference(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    let mut out = vec![BigRational::zero(); a.len().max(b.len())];
    for (i, c) in a.iter().enumerate() {
        out[i] += c;
    }
    for (i, c) in b.iter().enumerate() {
        out[i] -= c;
    }
    out
}

/// Convolution; None si le degré du produit dépasse DEGRE_MAX.
fn produit(a: &[BigRational], b: &[BigRational]) -> Option<Vec<BigRational>> {
    let a = elaguer(a.to_vec());
    let b = elaguer(b.to_vec());

    if degre(&a) + degre(&b) > DEGRE_MAX {
        return None;
    }

    let mut out = vec![BigRational::zero(); a.len() + b.len() - 1];
    for (i, ca) in a.iter().enumerate() {
        if ca.is_zero() {
            continue;
        }
        for (j, cb) in b.iter().enumerate() {
            out[i + j] += ca * cb;
        }
    }
    Some(out)
}

fn elaguer(mut coeffs: Vec<BigRational>) -> Vec<BigRational> {
    while coeffs.len() > 1 && coeffs.last().map(|c| c.is_zero()).unwrap_or(false) {
        coeffs.pop();
    }
    if coeffs.is_empty() {
        coeffs.push(BigRational::zero());
    }
    coeffs
}
