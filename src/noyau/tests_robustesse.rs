//! Tests de robustesse : marteler le pipeline sans brûler la machine.
//!
//! - RNG déterministe (graine fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte les erreurs *attendues* (syntaxe, division par zéro, symbole
//!   inconnu, aucune solution, faute du solveur, délai)
//! - invariants clés :
//!     * le pipeline ne panique jamais, quelle que soit l'entrée
//!     * erreur de résolution <=> zéro racine
//!     * l'affichage se rend sur tout résultat
//!     * évaluation déterministe (même entrée, même sortie)

use std::time::{Duration, Instant};

use super::affiche::{formater_resolution, formater_valeur};
use super::evalue::evaluer;
use super::resoud::{resoudre_avec_delai, ResultatEquation};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    etat: u64,
}

impl Rng {
    fn new(graine: u64) -> Self {
        Self { etat: graine }
    }

    fn suivant(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.etat = self.etat.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.etat >> 32) as u32
    }

    fn choisir(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.suivant() % n
        }
    }

    fn piece(&mut self) -> bool {
        (self.suivant() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(depart: Instant, max: Duration) {
    if depart.elapsed() > max {
        panic!("budget temps dépassé : {max:?}");
    }
}

/* ------------------------ Génération d'expressions (bornée) ------------------------ */

fn gen_atome(rng: &mut Rng, avec_x: bool) -> String {
    match rng.choisir(if avec_x { 6 } else { 5 }) {
        0 => format!("{}", rng.choisir(10)),
        1 => format!("{}.{}", rng.choisir(10), rng.choisir(100)),
        2 => "pi".to_string(),
        3 => "e".to_string(),
        4 => format!("{}", 1 + rng.choisir(6)),
        _ => "x".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, profondeur: u32, avec_x: bool) -> String {
    if profondeur == 0 {
        return gen_atome(rng, avec_x);
    }

    match rng.choisir(8) {
        0..=3 => {
            let op = match rng.choisir(5) {
                0 => "+",
                1 => "-",
                2 => "*",
                3 => "/",
                _ => "^",
            };
            format!(
                "{}{}{}",
                gen_expr(rng, profondeur - 1, avec_x),
                op,
                gen_expr(rng, profondeur - 1, avec_x)
            )
        }
        4 => format!("({})", gen_expr(rng, profondeur - 1, avec_x)),
        5 => {
            let f = match rng.choisir(8) {
                0 => "sin",
                1 => "cos",
                2 => "tan",
                3 => "sqrt",
                4 => "log",
                5 => "ln",
                6 => "exp",
                _ => "abs",
            };
            format!("{}({})", f, gen_expr(rng, profondeur - 1, avec_x))
        }
        6 => format!("-{}", gen_expr(rng, profondeur - 1, avec_x)),
        _ => gen_atome(rng, avec_x),
    }
}

/// Bruit brut : caractères arbitraires, y compris hors grammaire.
fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[u8] = b"0123456789x+-*/^()=. abcdefghijklmnopqrstuvwxyz_$#@!{}[]";
    let longueur = 1 + rng.choisir(40) as usize;
    (0..longueur)
        .map(|_| ALPHABET[rng.choisir(ALPHABET.len() as u32) as usize] as char)
        .collect()
}

/* ------------------------ Invariants ------------------------ */

fn verifier_resultat(r: &ResultatEquation, entree: &str) {
    assert_eq!(
        r.en_erreur(),
        r.racines.is_empty(),
        "invariant erreur<=>zéro racine violé pour {entree:?}"
    );
    // l'affichage doit se rendre dans tous les cas
    let _ = formater_resolution(r);
}

/* ------------------------ Campagnes ------------------------ */

#[test]
fn fuzz_evaluation_ne_panique_pas() {
    let depart = Instant::now();
    let mut rng = Rng::new(0xC0FFEE);

    for _ in 0..400 {
        budget(depart, Duration::from_secs(20));

        let expr = gen_expr(&mut rng, 4, false);
        // Ok ou Err, peu importe : jamais de panique, et déterministe
        let a = evaluer(&expr);
        let b = evaluer(&expr);
        assert_eq!(a, b, "évaluation non déterministe pour {expr:?}");

        if let Ok(v) = a {
            let _ = formater_valeur(&v);
        }
    }
}

#[test]
fn fuzz_resolution_ne_panique_pas() {
    let depart = Instant::now();
    let mut rng = Rng::new(0xB0B0);

    for _ in 0..120 {
        budget(depart, Duration::from_secs(40));

        let gauche = gen_expr(&mut rng, 3, true);
        let droite = if rng.piece() {
            gen_expr(&mut rng, 2, true)
        } else {
            format!("{}", rng.choisir(20))
        };
        let equation = format!("{gauche}={droite}");

        // budget court par équation : le délai est une issue acceptée
        let r = resoudre_avec_delai(&equation, Duration::from_millis(250));
        verifier_resultat(&r, &equation);
    }
}

#[test]
fn fuzz_bruit_brut() {
    let depart = Instant::now();
    let mut rng = Rng::new(0xDEAD_BEEF);

    for _ in 0..400 {
        budget(depart, Duration::from_secs(20));

        let bruit = gen_bruit(&mut rng);

        if let Ok(v) = evaluer(&bruit) {
            let _ = formater_valeur(&v);
        }

        let r = resoudre_avec_delai(&bruit, Duration::from_millis(250));
        verifier_resultat(&r, &bruit);
    }
}
