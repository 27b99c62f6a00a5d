//! Noyau du moteur d'évaluation et de résolution
//!
//! Organisation interne :
//! - erreurs.rs  : taxonomie d'erreurs + messages bornés
//! - garde.rs    : liste noire (défense en profondeur) + borne de longueur
//! - notation.rs : notation informelle -> forme canonique ASCII
//! - jetons.rs   : tokenisation + multiplication implicite
//! - syntaxe.rs  : shunting-yard -> RPN -> arbre
//! - arbre.rs    : AST exact (jeu de noeuds fermé) + outils rationnels
//! - evalue.rs   : évaluation numérique (table restreinte)
//! - polynome.rs : extraction polynomiale exacte + déflation
//! - resoud.rs   : résolution d'équations (exact + repli numérique)
//! - affiche.rs  : mise en forme (valeurs, racines, équations, messages)
//! - trace.rs    : description d'une fonction en vue d'un tracé

pub mod affiche;
pub mod arbre;
pub mod erreurs;
pub mod evalue;
pub mod garde;
pub mod jetons;
pub mod notation;
pub mod polynome;
pub mod resoud;
pub mod syntaxe;
pub mod trace;

#[cfg(test)]
mod tests_moteur;

#[cfg(test)]
mod tests_robustesse;

// API publique minimale
pub use affiche::{
    formater_calcul, formater_equation, formater_racine, formater_resolution, formater_valeur,
};
pub use erreurs::Erreur;
pub use evalue::{evaluer, evaluer_avec, ValeurNum};
pub use resoud::{
    resoudre, resoudre_avec_delai, Racine, ResultatEquation, TypeEquation, DELAI_DEFAUT,
};
pub use trace::{decrire_trace, DescriptionTrace};
