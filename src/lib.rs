//! moteur_maths : le coeur mathématique d'un assistant conversationnel.
//!
//! Prend une chaîne non fiable soumise par un utilisateur et rend un
//! résultat structuré : valeur numérique, racines d'équation, ou
//! description de tracé. Trois opérations :
//!
//! - [`evaluer`] (et [`evaluer_avec`]) : expression -> valeur numérique;
//! - [`resoudre`] (et [`resoudre_avec_delai`]) : équation en x -> racines
//!   ordonnées (réelles, surdes ou complexes) + famille détectée;
//! - [`decrire_trace`] : fonction de x -> expression appelable assainie,
//!   domaine suggéré, discontinuités connues.
//!
//! Le transport (chat), l'historique et le rendu des images appartiennent
//! aux collaborateurs : le moteur est sans état, chaque appel est une
//! fonction pure de son entrée. Les événements utiles à l'historique
//! partent sur la façade `log`.
//!
//! ```
//! use moteur_maths::{evaluer, formater_valeur, resoudre, formater_resolution};
//!
//! let v = evaluer("2+2*2").unwrap();
//! assert_eq!(formater_valeur(&v), "6");
//!
//! let r = resoudre("x**2-4=0");
//! assert!(!r.en_erreur());
//! assert_eq!(r.racines.len(), 2);
//! println!("{}", formater_resolution(&r));
//! ```

pub mod noyau;

pub use noyau::{
    decrire_trace, evaluer, evaluer_avec, formater_calcul, formater_equation, formater_racine,
    formater_resolution, formater_valeur, resoudre, resoudre_avec_delai, DescriptionTrace, Erreur,
    Racine, ResultatEquation, TypeEquation, ValeurNum, DELAI_DEFAUT,
};
