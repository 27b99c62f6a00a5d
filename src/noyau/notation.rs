// src/noyau/notation.rs
//
// Normalisation de notation : réécrit la notation humaine informelle en une
// forme canonique ASCII consommable par l'analyseur.
//
// Réécritures :
// - `**` -> `^` (puissance unique)
// - `×` -> `*`, `÷` -> `/`
// - `π` -> `pi`, `√` -> `sqrt`
// - espaces : supprimés (Evaluation/Resolution) ou compactés (Affichage)
//
// La multiplication implicite (`2x` -> `2*x`) n'est PAS traitée ici : elle
// s'insère au niveau des jetons (voir jetons::inserer_mult_implicite), une
// fois les noms de fonctions reconnus en entier. L'ordre est contraint :
// reconnaître `sin` d'abord, insérer `*` ensuite, sinon `sin` se fragmente
// en produit parasite `s*i*n`.

/// Consommateur visé par la normalisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cible {
    /// Évaluation numérique : pas de multiplication implicite.
    Evaluation,
    /// Résolution d'équation (et tracé) : multiplication implicite insérée
    /// en aval, au niveau des jetons.
    Resolution,
    /// Affichage : mêmes réécritures, espaces compactés au lieu de supprimés.
    Affichage,
}

/// Réécrit `texte` en forme canonique pour `cible`.
pub fn normaliser(texte: &str, cible: Cible) -> String {
    let mut s = String::with_capacity(texte.len());

    for c in texte.chars() {
        match c {
            '×' => s.push('*'),
            '÷' => s.push('/'),
            'π' => s.push_str("pi"),
            '√' => s.push_str("sqrt"),
            _ => s.push(c),
        }
    }

    let s = s.replace("**", "^");

    match cible {
        Cible::Evaluation | Cible::Resolution => {
            s.chars().filter(|c| !c.is_whitespace()).collect()
        }
        Cible::Affichage => compacter_espaces(&s),
    }
}

/// Réduit chaque suite de blancs à une seule espace, bords rognés.
fn compacter_espaces(texte: &str) -> String {
    texte.split_whitespace().collect::<Vec<_>>().join(" ")
}
