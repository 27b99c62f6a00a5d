// src/noyau/erreurs.rs

use thiserror::Error;

/// Longueur maximale d'un message destiné à l'utilisateur.
/// Les messages transportés vers le chat doivent rester bornés.
pub const LONGUEUR_MESSAGE_MAX: usize = 200;

/// Taxonomie des erreurs du moteur.
///
/// Toutes les erreurs sont rattrapées à la frontière du composant et
/// converties en résultat structuré; aucune ne remonte brute au transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Erreur {
    /// Entrée rejetée par la garde (liste noire). Jamais réessayée.
    #[error("l'expression contient des commandes non autorisées")]
    Securite,

    /// Grammaire mal formée.
    #[error("erreur de syntaxe : {0}")]
    Syntaxe(String),

    /// Identifiant hors de la table restreinte.
    #[error("fonction ou variable inconnue : {0}")]
    SymboleInconnu(String),

    /// Dénominateur littéralement nul.
    #[error("division par zéro")]
    DivisionParZero,

    /// Faute arithmétique générique.
    #[error("expression incorrecte : {0}")]
    Evaluation(String),

    /// L'équation ne contient pas de '='.
    #[error("l'équation doit contenir '='")]
    EgalManquant,

    /// Zéro racine trouvée : c'est un échec, pas un succès vide.
    #[error("l'équation n'a pas de solution")]
    AucuneSolution,

    /// Le solveur n'a pas pu traiter la forme soumise.
    #[error("impossible de résoudre l'équation : {0}")]
    Solveur(String),

    /// Budget temps du solveur épuisé. Déterministe : pas de réessai.
    #[error("délai de résolution dépassé")]
    DelaiDepasse,
}

impl Erreur {
    /// Message utilisateur, borné à LONGUEUR_MESSAGE_MAX.
    pub fn message(&self) -> String {
        borner(&self.to_string())
    }
}

/// Tronque un texte à LONGUEUR_MESSAGE_MAX caractères (pas d'octets :
/// on ne coupe jamais au milieu d'un point de code).
pub fn borner(texte: &str) -> String {
    if texte.chars().count() <= LONGUEUR_MESSAGE_MAX {
        return texte.to_string();
    }
    texte.chars().take(LONGUEUR_MESSAGE_MAX).collect()
}
