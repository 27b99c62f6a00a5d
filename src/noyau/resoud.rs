// src/noyau/resoud.rs
//
// Résolution d'équations à une variable (x).
//
// Pipeline : garde -> coupe sur '=' -> normalisation (cible Résolution,
// multiplication implicite comprise) -> arbres gauche/droite -> différence
// gauche - droite -> recherche de toutes les racines :
//
// 1. Voie exacte : la différence s'écrit comme polynôme rationnel en x.
//    - degré 0  : aucune solution (contradiction ou identité, le moteur ne
//      distingue pas : zéro racine est un échec, jamais un succès vide)
//    - degré 1  : racine rationnelle exacte
//    - degré 2  : formule quadratique exacte (rationnelles, surdes, ou
//      complexes conjuguées, branche "moins" d'abord)
//    - degré ≥3 : déflation par racines rationnelles (diviseurs du terme
//      constant / du coefficient dominant), puis quadratique exacte ou
//      itération de Durand-Kerner sur le reste
// 2. Voie numérique (fonctions, puissances symboliques, constantes
//    transcendantes) : balayage en signe + dichotomie sur des plages
//    croissantes, dédoublonnage à 1e-6.
//
// Le tout sous budget temps : le dépassement est rendu comme n'importe
// quelle faute du solveur, jamais propagé brut.
//
// NOTE : dans cette voie, `log` est traité comme logarithme népérien (le
// moteur symbolique n'expose qu'un logarithme), alors que l'évaluateur
// numérique lit `log` en base 10. La divergence est assumée et documentée.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::arbre::{extraire_carres, racine_carree_exacte, Expr, Fonction};
use super::erreurs::Erreur;
use super::evalue::eval_f64;
use super::garde;
use super::notation::{normaliser, Cible};
use super::polynome::{coefficients, deflater, degre};
use super::syntaxe::analyser;

/// Budget temps par défaut d'une résolution.
pub const DELAI_DEFAUT: Duration = Duration::from_secs(2);

/* ------------------------ Types de résultat ------------------------ */

/// Famille d'équation, dérivée de la présence de jetons dans le texte
/// normalisé et du nombre de racines. Heuristique d'affichage assumée :
/// un polynôme contenant la sous-chaîne "sin" dans un sous-terme sera
/// classé trigonométrique. L'ordre de priorité est fixe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeEquation {
    Lineaire,
    Quadratique,
    Polynomiale(usize),
    Trigonometrique,
    Exponentielle,
    Logarithmique,
    Algebrique,
}

impl fmt::Display for TypeEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeEquation::Lineaire => write!(f, "linéaire"),
            TypeEquation::Quadratique => write!(f, "quadratique"),
            TypeEquation::Polynomiale(n) => write!(f, "polynomiale de degré {n}"),
            TypeEquation::Trigonometrique => write!(f, "trigonométrique"),
            TypeEquation::Exponentielle => write!(f, "exponentielle"),
            TypeEquation::Logarithmique => write!(f, "logarithmique"),
            TypeEquation::Algebrique => write!(f, "algébrique"),
        }
    }
}

/// Racine d'équation, toujours structurée (jamais de chirurgie de chaîne).
#[derive(Clone, Debug, PartialEq)]
pub enum Racine {
    /// Racine rationnelle exacte.
    Rationnelle(BigRational),
    /// q + c·√n exacte (n > 1, sans facteur carré détectable).
    Surde {
        q: BigRational,
        c: BigRational,
        n: BigInt,
    },
    /// re + (c·√n)·i exacte, c ≠ 0 (n == 1 : partie imaginaire rationnelle).
    Complexe {
        re: BigRational,
        c: BigRational,
        n: BigInt,
    },
    /// Racine réelle approchée (repli numérique).
    Approchee(f64),
    /// Racine complexe approchée (repli numérique), im ≠ 0.
    ApprocheeComplexe { re: f64, im: f64 },
}

impl Racine {
    /// Une racine est complexe si sa représentation porte une partie
    /// imaginaire; elle déclenche la note sur l'unité imaginaire.
    pub fn est_complexe(&self) -> bool {
        matches!(
            self,
            Racine::Complexe { .. } | Racine::ApprocheeComplexe { .. }
        )
    }
}

/// Résultat structuré d'une résolution.
/// Invariant : `erreur.is_some()` équivaut à `racines.is_empty()`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultatEquation {
    /// L'équation telle que soumise.
    pub equation: String,
    /// Famille détectée (None en cas d'échec).
    pub genre: Option<TypeEquation>,
    /// Racines, dans l'ordre déterministe du moteur.
    pub racines: Vec<Racine>,
    /// Diagnostic borné, sûr pour l'utilisateur.
    pub erreur: Option<String>,
}

impl ResultatEquation {
    pub fn en_erreur(&self) -> bool {
        self.erreur.is_some()
    }

    fn succes(equation: &str, genre: TypeEquation, racines: Vec<Racine>) -> Self {
        ResultatEquation {
            equation: equation.to_string(),
            genre: Some(genre),
            racines,
            erreur: None,
        }
    }

    fn echec(equation: &str, e: &Erreur) -> Self {
        ResultatEquation {
            equation: equation.to_string(),
            genre: None,
            racines: Vec::new(),
            erreur: Some(e.message()),
        }
    }
}

/* ------------------------ API publique ------------------------ */

/// Résout une équation avec le budget temps par défaut.
pub fn resoudre(equation: &str) -> ResultatEquation {
    resoudre_avec_delai(equation, DELAI_DEFAUT)
}

/// Résout une équation sous budget temps explicite.
/// Toute faute (forme non supportée, délai, grammaire) est rendue comme un
/// résultat en erreur; cette fonction ne panique jamais.
pub fn resoudre_avec_delai(equation: &str, delai: Duration) -> ResultatEquation {
    let debut = Instant::now();

    match resoudre_interne(equation, debut, delai) {
        Ok((norme, racines)) => {
            if racines.is_empty() {
                // défense : zéro racine reste un échec
                return ResultatEquation::echec(equation, &Erreur::AucuneSolution);
            }
            let genre = classer(&norme, racines.len());
            log::info!(
                "résolution : {norme} => {} racine(s), {genre}",
                racines.len()
            );
            ResultatEquation::succes(equation, genre, racines)
        }
        Err(e) => {
            log::warn!("résolution : {equation:?} => {e}");
            ResultatEquation::echec(equation, &e)
        }
    }
}

fn resoudre_interne(
    brut: &str,
    debut: Instant,
    delai: Duration,
) -> Result<(String, Vec<Racine>), Erreur> {
    garde::verifier(brut)?;

    if !brut.contains('=') {
        return Err(Erreur::EgalManquant);
    }

    let norme = normaliser(brut, Cible::Resolution);
    garde::verifier(&norme)?;

    // coupe sur le PREMIER '=' ; un second '=' échouera à la tokenisation
    let (gauche, droite) = norme.split_once('=').unwrap_or((norme.as_str(), ""));

    let arbre_g = analyser(gauche, Cible::Resolution)?;
    let arbre_d = analyser(droite, Cible::Resolution)?;

    let difference = forcer_log_naturel(Expr::Sub(Box::new(arbre_g), Box::new(arbre_d)))
        .simplifier();

    let racines = match coefficients(&difference) {
        Some(coeffs) => racines_polynome(&coeffs, debut, delai)?,
        None => racines_numeriques(&difference, debut, delai)?,
    };

    Ok((norme, racines))
}

/// Classement par présence de jetons puis nombre de racines, priorité fixe.
fn classer(texte_normalise: &str, nb_racines: usize) -> TypeEquation {
    let t = texte_normalise.to_lowercase();

    if t.contains("sin") || t.contains("cos") || t.contains("tan") {
        TypeEquation::Trigonometrique
    } else if t.contains("exp") {
        TypeEquation::Exponentielle
    } else if t.contains("log") || t.contains("ln") {
        TypeEquation::Logarithmique
    } else if nb_racines > 2 {
        TypeEquation::Polynomiale(nb_racines)
    } else if nb_racines == 2 {
        TypeEquation::Quadratique
    } else if nb_racines == 1 {
        TypeEquation::Lineaire
    } else {
        TypeEquation::Algebrique
    }
}

/// Dans la voie symbolique, `log` devient le logarithme népérien.
fn forcer_log_naturel(e: Expr) -> Expr {
    use Expr::*;
    match e {
        Fct(Fonction::Log, x) => Fct(Fonction::Ln, Box::new(forcer_log_naturel(*x))),
        Fct(f, x) => Fct(f, Box::new(forcer_log_naturel(*x))),
        Add(a, b) => Add(
            Box::new(forcer_log_naturel(*a)),
            Box::new(forcer_log_naturel(*b)),
        ),
        Sub(a, b) => Sub(
            Box::new(forcer_log_naturel(*a)),
            Box::new(forcer_log_naturel(*b)),
        ),
        Mul(a, b) => Mul(
            Box::new(forcer_log_naturel(*a)),
            Box::new(forcer_log_naturel(*b)),
        ),
        Div(a, b) => Div(
            Box::new(forcer_log_naturel(*a)),
            Box::new(forcer_log_naturel(*b)),
        ),
        Pow(a, b) => Pow(
            Box::new(forcer_log_naturel(*a)),
            Box::new(forcer_log_naturel(*b)),
        ),
        feuille => feuille,
    }
}

/* ------------------------ Voie exacte (polynômes) ------------------------ */

fn racines_polynome(
    coeffs: &[BigRational],
    debut: Instant,
    delai: Duration,
) -> Result<Vec<Racine>, Erreur> {
    // contradiction (c ≠ 0) ou identité (0 = 0) : zéro racine dans les deux
    // cas, le moteur ne les distingue pas
    if degre(coeffs) == 0 {
        return Err(Erreur::AucuneSolution);
    }

    let mut reste = coeffs.to_vec();
    let mut rationnelles: Vec<BigRational> = Vec::new();

    // racines nulles : terme constant nul
    while degre(&reste) >= 1 && reste[0].is_zero() {
        rationnelles.push(BigRational::zero());
        reste.remove(0);
    }

    // déflation par candidats rationnels
    while degre(&reste) >= 3 {
        verifier_delai(debut, delai)?;

        let mut trouvee = None;
        for cand in candidats_rationnels(&reste) {
            if deflater(&reste, &cand).is_some() {
                trouvee = Some(cand);
                break;
            }
        }

        match trouvee {
            Some(r) => {
                if let Some(q) = deflater(&reste, &r) {
                    rationnelles.push(r);
                    reste = q;
                }
            }
            None => break,
        }
    }

    rationnelles.sort();
    rationnelles.dedup();

    let mut racines: Vec<Racine> = rationnelles.into_iter().map(Racine::Rationnelle).collect();

    match degre(&reste) {
        0 => {}
        1 => racines.push(Racine::Rationnelle(-&reste[0] / &reste[1])),
        2 => racines.extend(quadratique(&reste[2], &reste[1], &reste[0])),
        _ => racines.extend(durand_kerner(&reste, debut, delai)?),
    }

    dedoublonner_exactes(&mut racines);

    if racines.is_empty() {
        return Err(Erreur::AucuneSolution);
    }
    Ok(racines)
}

/// Formule quadratique exacte pour a·x² + b·x + c = 0.
/// Branche "moins" toujours en premier.
fn quadratique(a: &BigRational, b: &BigRational, c: &BigRational) -> Vec<Racine> {
    let deux_a = a + a;
    let q = -b / &deux_a;
    let disc = b * b - BigRational::from_integer(BigInt::from(4)) * a * c;

    if disc.is_zero() {
        // racine double : le moteur rend les racines distinctes
        return vec![Racine::Rationnelle(q)];
    }

    let positif = disc.is_positive();
    let disc_abs = disc.abs();

    if let Some(s) = racine_carree_exacte(&disc_abs) {
        let ecart = s / &deux_a;
        let mag = ecart.abs();
        return if positif {
            vec![
                Racine::Rationnelle(&q - &mag),
                Racine::Rationnelle(&q + &mag),
            ]
        } else {
            vec![
                Racine::Complexe {
                    re: q.clone(),
                    c: -mag.clone(),
                    n: BigInt::one(),
                },
                Racine::Complexe {
                    re: q,
                    c: mag,
                    n: BigInt::one(),
                },
            ]
        };
    }

    // √(n/m) = √(n·m)/m, puis extraction des carrés parfaits
    let (hors, radicande) = extraire_carres(&(disc_abs.numer() * disc_abs.denom()));
    let coeff = BigRational::new(hors, disc_abs.denom().clone()) / &deux_a;
    let mag = coeff.abs();

    if positif {
        vec![
            Racine::Surde {
                q: q.clone(),
                c: -mag.clone(),
                n: radicande.clone(),
            },
            Racine::Surde {
                q,
                c: mag,
                n: radicande,
            },
        ]
    } else {
        vec![
            Racine::Complexe {
                re: q.clone(),
                c: -mag.clone(),
                n: radicande.clone(),
            },
            Racine::Complexe {
                re: q,
                c: mag,
                n: radicande,
            },
        ]
    }
}

/// Candidats p/q du théorème des racines rationnelles, triés croissants.
/// Liste vide si les diviseurs ne s'énumèrent pas raisonnablement.
fn candidats_rationnels(coeffs: &[BigRational]) -> Vec<BigRational> {
    use std::collections::BTreeSet;

    // mise à l'échelle entière
    let mut echelle = BigInt::one();
    for c in coeffs {
        echelle = ppcm(&echelle, c.denom());
    }
    let entiers: Vec<BigInt> = coeffs
        .iter()
        .map(|c| c.numer() * (&echelle / c.denom()))
        .collect();

    let (Some(a0), Some(an)) = (entiers.first(), entiers.last()) else {
        return Vec::new();
    };

    let (Some(ps), Some(qs)) = (diviseurs(a0), diviseurs(an)) else {
        return Vec::new();
    };

    let mut out: BTreeSet<BigRational> = BTreeSet::new();
    for p in &ps {
        for q in &qs {
            let r = BigRational::new(BigInt::from(*p), BigInt::from(*q));
            out.insert(r.clone());
            out.insert(-r);
            if out.len() > 1024 {
                return out.into_iter().collect();
            }
        }
    }

    out.into_iter().collect()
}

/// Diviseurs positifs de |n|; None si |n| déborde ou est trop grand pour
/// une énumération raisonnable.
fn diviseurs(n: &BigInt) -> Option<Vec<i64>> {
    let v = n.abs().to_i64()?;
    if v == 0 || v > 1_000_000_000_000 {
        return None;
    }

    let mut out = Vec::new();
    let mut i: i64 = 1;
    while i * i <= v {
        if v % i == 0 {
            out.push(i);
            out.push(v / i);
        }
        i += 1;
    }
    out.sort_unstable();
    out.dedup();
    Some(out)
}

fn ppcm(a: &BigInt, b: &BigInt) -> BigInt {
    let g = pgcd(a.clone(), b.clone());
    if g.is_zero() {
        return BigInt::zero();
    }
    (a / &g * b).abs()
}

fn pgcd(mut a: BigInt, mut b: BigInt) -> BigInt {
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a.abs()
}

fn dedoublonner_exactes(racines: &mut Vec<Racine>) {
    let mut vues: Vec<Racine> = Vec::with_capacity(racines.len());
    racines.retain(|r| {
        if vues.contains(r) {
            false
        } else {
            vues.push(r.clone());
            true
        }
    });
}

/* ------------------------ Durand-Kerner (reste de degré ≥ 3) ------------------------ */

const DK_ITERATIONS_MAX: usize = 500;
const DK_TOLERANCE: f64 = 1e-12;

/// Racines complexes approchées d'un polynôme de degré ≥ 3 sans racine
/// rationnelle restante. Itération simultanée de Durand-Kerner sur le
/// polynôme rendu unitaire.
fn durand_kerner(
    coeffs: &[BigRational],
    debut: Instant,
    delai: Duration,
) -> Result<Vec<Racine>, Erreur> {
    let n = degre(coeffs);
    let dominant = coeffs[n].to_f64().unwrap_or(f64::NAN);
    if !dominant.is_finite() || dominant == 0.0 {
        return Err(Erreur::Solveur("coefficients hors gamme".into()));
    }

    let unitaire: Vec<Complex64> = coeffs
        .iter()
        .map(|c| Complex64::new(c.to_f64().unwrap_or(f64::NAN) / dominant, 0.0))
        .collect();
    if unitaire.iter().any(|c| !c.re.is_finite()) {
        return Err(Erreur::Solveur("coefficients hors gamme".into()));
    }

    // points de départ déterministes, non réels, non équidistribués
    let germe = Complex64::new(0.4, 0.9);
    let mut z: Vec<Complex64> = (0..n)
        .map(|k| germe.powi(k as i32 + 1))
        .collect();

    let horner = |x: Complex64| -> Complex64 {
        let mut acc = Complex64::new(0.0, 0.0);
        for c in unitaire.iter().rev() {
            acc = acc * x + c;
        }
        acc
    };

    let mut converge = false;
    for _ in 0..DK_ITERATIONS_MAX {
        verifier_delai(debut, delai)?;

        let mut delta_max = 0.0f64;
        for k in 0..n {
            let mut den = Complex64::new(1.0, 0.0);
            for j in 0..n {
                if j != k {
                    den *= z[k] - z[j];
                }
            }
            if den.norm() < 1e-30 {
                den = Complex64::new(1e-15, 1e-15);
            }

            let delta = horner(z[k]) / den;
            z[k] -= delta;
            delta_max = delta_max.max(delta.norm());
        }

        if delta_max < DK_TOLERANCE {
            converge = true;
            break;
        }
    }

    if !converge {
        return Err(Erreur::Solveur("itération numérique non convergente".into()));
    }

    // tri déterministe puis dédoublonnage
    z.sort_by(|a, b| {
        a.re.partial_cmp(&b.re)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.im.partial_cmp(&b.im).unwrap_or(std::cmp::Ordering::Equal))
    });
    z.dedup_by(|a, b| (a.re - b.re).abs() < 1e-6 && (a.im - b.im).abs() < 1e-6);

    Ok(z.into_iter().map(racine_depuis_complexe).collect())
}

fn racine_depuis_complexe(v: Complex64) -> Racine {
    if v.im.abs() <= 1e-8 * v.re.abs().max(1.0) {
        return racine_reelle_approchee(v.re);
    }
    let re = if v.re.abs() < 1e-10 { 0.0 } else { v.re };
    Racine::ApprocheeComplexe { re, im: v.im }
}

/// Accroche les réels approchés aux entiers proches (forme exacte sinon
/// flottante).
fn racine_reelle_approchee(r: f64) -> Racine {
    let proche = r.round();
    if (r - proche).abs() < 1e-8 && proche.abs() < 9.0e15 {
        return Racine::Rationnelle(BigRational::from_integer(BigInt::from(proche as i64)));
    }
    Racine::Approchee(r)
}

/* ------------------------ Voie numérique (non polynomiale) ------------------------ */

/// Plages de recherche, élargies tant qu'aucune racine n'apparaît.
const PLAGES: [(f64, f64); 3] = [(-10.0, 10.0), (-100.0, 100.0), (-1000.0, 1000.0)];
const PAS_PAR_PLAGE: usize = 4000;

fn racines_numeriques(
    arbre: &Expr,
    debut: Instant,
    delai: Duration,
) -> Result<Vec<Racine>, Erreur> {
    let mut vu_finie = false;

    for (a, b) in PLAGES {
        verifier_delai(debut, delai)?;

        let pas = (b - a) / PAS_PAR_PLAGE as f64;
        let mut precedente: Option<(f64, f64)> = None;
        // série de zéros exacts consécutifs : (longueur, premier x).
        // Un zéro n'est une racine que s'il est ISOLÉ : un plateau de zéros
        // trahit un sous-débordement flottant (exp(x) pour x très négatif),
        // pas une racine.
        let mut serie_zero: Option<(usize, f64)> = None;
        let mut trouvees: Vec<f64> = Vec::new();

        for i in 0..=PAS_PAR_PLAGE {
            if i % 256 == 0 {
                verifier_delai(debut, delai)?;
            }

            let x = a + pas * i as f64;
            let fx = match evaluer_point(arbre, x) {
                Ok(v) => v,
                Err(e) => return Err(Erreur::Solveur(e.message())),
            };

            if !fx.is_finite() {
                if let Some((1, x0)) = serie_zero {
                    trouvees.push(x0);
                }
                serie_zero = None;
                precedente = None;
                continue;
            }
            vu_finie = true;

            if fx == 0.0 {
                serie_zero = match serie_zero {
                    None => Some((1, x)),
                    Some((long, x0)) => Some((long + 1, x0)),
                };
                continue;
            }

            if let Some((1, x0)) = serie_zero {
                trouvees.push(x0);
            }
            serie_zero = None;

            if let Some((px, pfx)) = precedente {
                if pfx * fx < 0.0 {
                    if let Some(r) = dichotomie(arbre, px, x, pfx, debut, delai)? {
                        trouvees.push(r);
                    }
                }
            }
            precedente = Some((x, fx));
        }

        if let Some((1, x0)) = serie_zero {
            trouvees.push(x0);
        }

        trouvees.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
        trouvees.dedup_by(|p, q| (*p - *q).abs() < 1e-6);

        if !trouvees.is_empty() {
            return Ok(trouvees.into_iter().map(racine_reelle_approchee).collect());
        }
    }

    if vu_finie {
        Err(Erreur::AucuneSolution)
    } else {
        Err(Erreur::Solveur(
            "fonction non évaluable sur la plage de recherche".into(),
        ))
    }
}

/// Dichotomie sur un encadrement à changement de signe.
fn dichotomie(
    arbre: &Expr,
    mut a: f64,
    mut b: f64,
    mut fa: f64,
    debut: Instant,
    delai: Duration,
) -> Result<Option<f64>, Erreur> {
    for i in 0..200 {
        if i % 32 == 0 {
            verifier_delai(debut, delai)?;
        }

        let m = 0.5 * (a + b);
        let fm = match evaluer_point(arbre, m) {
            Ok(v) => v,
            Err(e) => return Err(Erreur::Solveur(e.message())),
        };
        if !fm.is_finite() {
            return Ok(None);
        }
        if fm == 0.0 {
            return Ok(Some(m));
        }

        if fa * fm < 0.0 {
            b = m;
        } else {
            a = m;
            fa = fm;
        }

        if (b - a).abs() < 1e-12 {
            break;
        }
    }
    Ok(Some(0.5 * (a + b)))
}

pub(crate) fn evaluer_point(arbre: &Expr, x: f64) -> Result<f64, Erreur> {
    let mut vars = HashMap::with_capacity(1);
    vars.insert("x".to_string(), x);
    eval_f64(arbre, &vars)
}

fn verifier_delai(debut: Instant, delai: Duration) -> Result<(), Erreur> {
    if debut.elapsed() > delai {
        return Err(Erreur::DelaiDepasse);
    }
    Ok(())
}

/* ------------------------ Tests ------------------------ */
