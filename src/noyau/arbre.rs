// src/noyau/arbre.rs
//
// Arbre d'expression exact (sans flottants).
// Jeu de noeuds FERMÉ : nombre rationnel, constantes π et e, variable,
// application de fonction unaire, opération binaire, puissance.
// Aucune chaîne n'est jamais ré-interprétée : l'arbre est la seule forme
// exécutable, et seul l'interpréteur du noyau la parcourt.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use std::fmt;

/// Fonctions unaires de la table restreinte.
/// `Log` est le logarithme décimal, `Ln` le logarithme népérien.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Log,
    Ln,
    Exp,
    Abs,
}

impl Fonction {
    /// Résolution d'un identifiant (déjà en minuscules) vers la table.
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        match nom {
            "sin" => Some(Fonction::Sin),
            "cos" => Some(Fonction::Cos),
            "tan" => Some(Fonction::Tan),
            "sqrt" => Some(Fonction::Sqrt),
            "log" => Some(Fonction::Log),
            "ln" => Some(Fonction::Ln),
            "exp" => Some(Fonction::Exp),
            "abs" => Some(Fonction::Abs),
            _ => None,
        }
    }

    pub fn nom(&self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Sqrt => "sqrt",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
            Fonction::Exp => "exp",
            Fonction::Abs => "abs",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    E,

    Var(String),

    Fct(Fonction, Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn entier(n: i64) -> Expr {
        Expr::Rat(BigRational::from_integer(BigInt::from(n)))
    }

    /// Simplification locale : pliage des constantes rationnelles et
    /// suppression des éléments neutres. Ne devine jamais une valeur pour
    /// Var, Pi ou E; ne touche pas aux fonctions.
    pub fn simplifier(self) -> Expr {
        use Expr::*;

        match self {
            Rat(_) | Pi | E | Var(_) => self,

            Fct(f, x) => Fct(f, Box::new(x.simplifier())),

            Add(a, b) => {
                let a = a.simplifier();
                let b = b.simplifier();
                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplifier();
                let b = b.simplifier();

                if a == b {
                    return Rat(BigRational::zero());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplifier();
                let b = b.simplifier();
                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),
                    (_, Rat(y)) if y.is_zero() => Rat(BigRational::zero()),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplifier();
                let b = b.simplifier();

                // dénominateur littéralement nul : on garde la forme telle
                // quelle, l'évaluateur tranchera (erreur ou indéfini)
                if matches!(&b, Rat(y) if y.is_zero()) {
                    return Div(Box::new(a), Box::new(b));
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            Pow(base, exp) => {
                let base = base.simplifier();
                let exp = exp.simplifier();

                if let (Rat(b), Rat(e)) = (&base, &exp) {
                    if e.denom().is_one() {
                        if let Some(n) = entier_i64(e.numer()) {
                            // bornes : 0^-n resterait une division par zéro,
                            // et le résultat doit rester de taille raisonnable
                            // (les tours de puissances restent symboliques)
                            let bits = b.numer().bits().max(b.denom().bits()).max(1);
                            let borne = n.abs() <= 4096
                                && bits.saturating_mul(n.unsigned_abs()) <= 65_536;
                            if borne && !(b.is_zero() && n < 0) {
                                return Rat(puissance_rationnelle(b.clone(), n));
                            }
                        }
                    }
                }

                Pow(Box::new(base), Box::new(exp))
            }
        }
    }

    /// Détecte si l'expression contient au moins une variable.
    /// Itératif avec garde-fous : si l'arbre est trop gros on répond true
    /// (réponse sûre : le consommateur traitera l'expression comme variable).
    pub fn contient_var(&self) -> bool {
        use Expr::*;

        const MAX_PILE: usize = 8192;
        const MAX_NOEUDS: usize = 200_000;

        let mut pile: Vec<&Expr> = Vec::with_capacity(64);
        pile.push(self);

        let mut visites: usize = 0;

        while let Some(e) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS || pile.len() > MAX_PILE {
                return true;
            }

            match e {
                Var(_) => return true,

                Rat(_) | Pi | E => {}

                Fct(_, x) => pile.push(x.as_ref()),

                Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => {
                    pile.push(a.as_ref());
                    pile.push(b.as_ref());
                }
            }
        }

        false
    }
}

/* ------------------------ Outils rationnels ------------------------ */

/// Conversion SAFE vers i64 (refuse ce qui ne rentre pas).
pub(crate) fn entier_i64(x: &BigInt) -> Option<i64> {
    x.to_string().parse::<i64>().ok()
}

/// base^exp par carrés successifs, exposant entier signé.
pub(crate) fn puissance_rationnelle(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = puissance_rationnelle(base, -exp);
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

/// √r exacte si elle existe (numérateur et dénominateur carrés parfaits).
pub(crate) fn racine_carree_exacte(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = racine_entiere_exacte(r.numer())?;
    let sd = racine_entiere_exacte(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn racine_entiere_exacte(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = racine_entiere_plancher(x);
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}

/// floor(√x) par itération de Newton sur BigInt.
fn racine_entiere_plancher(x: &BigInt) -> BigInt {
    if x.is_zero() || x.is_negative() {
        return BigInt::zero();
    }

    let bits = x.bits();
    let mut y = BigInt::one() << bits.div_ceil(2);

    loop {
        let y_suiv = (&y + (x / &y)) >> 1;
        if y_suiv >= y {
            let mut z = y_suiv;
            while (&z + 1u32) * (&z + 1u32) <= *x {
                z += 1u32;
            }
            while &z * &z > *x {
                z -= 1u32;
            }
            return z;
        }
        y = y_suiv;
    }
}

/// n = a²·b : extrait les facteurs carrés de n (essais jusqu'à 1000).
/// Retourne (a, b) avec b sans facteur carré détectable.
pub(crate) fn extraire_carres(n: &BigInt) -> (BigInt, BigInt) {
    let mut dehors = BigInt::one();
    let mut dedans = n.clone();

    if dedans.is_negative() || dedans.is_zero() {
        return (dehors, dedans);
    }

    let mut p: u64 = 2;
    while p <= 1000 {
        let carre = BigInt::from(p) * BigInt::from(p);
        while (&dedans % &carre).is_zero() {
            dedans /= &carre;
            dehors *= BigInt::from(p);
        }
        p += 1;
    }

    (dehors, dedans)
}

/* ------------------------ Affichage debug ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                let n = r.numer();
                let d = r.denom();
                if d.is_one() {
                    write!(f, "{n}")
                } else {
                    write!(f, "{n}/{d}")
                }
            }
            Pi => write!(f, "pi"),
            E => write!(f, "e"),
            Var(s) => write!(f, "{s}"),
            Fct(fun, x) => write!(f, "{}({x})", fun.nom()),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
            Pow(a, b) => write!(f, "({a}^{b})"),
        }
    }
}
