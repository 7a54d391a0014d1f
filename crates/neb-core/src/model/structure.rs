use nalgebra::Vector3;
use thiserror::Error;

/// Fractional deltas larger than this are assumed to have crossed a periodic
/// cell boundary and are wrapped back into the [-0.5, 0.5] range.
const WRAP_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Species counts declare {expected} atoms but {actual} positions were given")]
    AtomCountMismatch { expected: usize, actual: usize },
    #[error(
        "Endpoint structures are incompatible: first has {first_atoms} atoms ({first_species}), last has {last_atoms} atoms ({last_species})"
    )]
    EndpointMismatch {
        first_atoms: usize,
        last_atoms: usize,
        first_species: String,
        last_species: String,
    },
}

/// A contiguous block of atoms belonging to one element in a structure file.
///
/// Structure files group atoms by element; the order of blocks matches the
/// order of position rows, so blocks are positional and significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesBlock {
    /// Element symbol as written in the file (e.g. "Si", "O").
    pub symbol: String,
    /// Number of consecutive position rows belonging to this element.
    pub count: usize,
}

impl SpeciesBlock {
    pub fn new(symbol: impl Into<String>, count: usize) -> Self {
        Self {
            symbol: symbol.into(),
            count,
        }
    }
}

/// Represents a complete periodic crystal structure.
///
/// This is an immutable value type: it can only be created through the
/// validating [`Structure::new`] constructor (or by interpolation from an
/// existing structure), so every instance upholds the invariant that the
/// number of atomic positions equals the sum of the species counts.
///
/// Atomic positions are fractional (direct) coordinates, nominally in
/// `[0, 1)`, which makes periodic wraparound during differencing meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    comment: String,
    scale: f64,
    lattice: [Vector3<f64>; 3],
    species: Vec<SpeciesBlock>,
    coordinate_mode: String,
    positions: Vec<Vector3<f64>>,
}

/// Component-wise difference between two endpoint structures.
///
/// Every field holds a delta rather than an absolute value. Atomic position
/// deltas are already wrapped to the shortest periodic path, so applying a
/// delta scaled by a fraction in `[0, 1]` traces the direct interpolation
/// route between the endpoints.
///
/// Deltas carry only the numeric fields; the text fields (comment, species,
/// coordinate mode) of an interpolated image are always taken verbatim from
/// the first endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDelta {
    scale: f64,
    lattice: [Vector3<f64>; 3],
    positions: Vec<Vector3<f64>>,
}

impl Structure {
    /// Creates a new structure, validating the composition invariant.
    ///
    /// # Arguments
    ///
    /// * `comment` - Free-text comment line, reproduced verbatim on output.
    /// * `scale` - Global lattice scale factor.
    /// * `lattice` - The three lattice vectors a, b, c.
    /// * `species` - Ordered element blocks (symbol and atom count each).
    /// * `coordinate_mode` - Coordinate-mode marker line, reproduced verbatim.
    /// * `positions` - Fractional atomic positions, grouped by species block.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AtomCountMismatch`] if the number of positions
    /// does not equal the sum of the species counts.
    pub fn new(
        comment: impl Into<String>,
        scale: f64,
        lattice: [Vector3<f64>; 3],
        species: Vec<SpeciesBlock>,
        coordinate_mode: impl Into<String>,
        positions: Vec<Vector3<f64>>,
    ) -> Result<Self, ModelError> {
        let expected: usize = species.iter().map(|s| s.count).sum();
        if positions.len() != expected {
            return Err(ModelError::AtomCountMismatch {
                expected,
                actual: positions.len(),
            });
        }
        Ok(Self {
            comment: comment.into(),
            scale,
            lattice,
            species,
            coordinate_mode: coordinate_mode.into(),
            positions,
        })
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn lattice(&self) -> &[Vector3<f64>; 3] {
        &self.lattice
    }

    pub fn species(&self) -> &[SpeciesBlock] {
        &self.species
    }

    pub fn coordinate_mode(&self) -> &str {
        &self.coordinate_mode
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    /// Total number of atoms, i.e. the sum of all species counts.
    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    /// Computes the component-wise difference `last - first` between two
    /// endpoint structures.
    ///
    /// Scale and lattice components are subtracted directly. Atomic position
    /// deltas are wrapped per axis: a raw delta strictly greater than `0.5`
    /// has `1.0` subtracted, one strictly less than `-0.5` has `1.0` added.
    /// With fractional coordinates in `[0, 1)` this picks the shortest path
    /// across a periodic cell boundary on each axis independently.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EndpointMismatch`] if the two structures do not
    /// carry identical species blocks. Atom order is positional: the Nth atom
    /// of `first` and the Nth atom of `last` must be the same physical atom,
    /// and differing compositions would pair unrelated atoms silently.
    pub fn delta_from(last: &Structure, first: &Structure) -> Result<StructureDelta, ModelError> {
        if last.species != first.species {
            return Err(ModelError::EndpointMismatch {
                first_atoms: first.atom_count(),
                last_atoms: last.atom_count(),
                first_species: format_species(&first.species),
                last_species: format_species(&last.species),
            });
        }

        let lattice = [
            last.lattice[0] - first.lattice[0],
            last.lattice[1] - first.lattice[1],
            last.lattice[2] - first.lattice[2],
        ];

        let positions = last
            .positions
            .iter()
            .zip(&first.positions)
            .map(|(l, f)| (l - f).map(wrap_fractional))
            .collect();

        Ok(StructureDelta {
            scale: last.scale - first.scale,
            lattice,
            positions,
        })
    }

    /// Builds the image at `fraction` along the path from this structure.
    ///
    /// Every numeric field of the result equals
    /// `self_value + delta_value * fraction`; the comment, species blocks,
    /// and coordinate mode are copied verbatim from `self`.
    ///
    /// The delta must stem from [`Structure::delta_from`] with `self` as the
    /// `first` endpoint, which guarantees matching atom counts.
    pub fn interpolated(&self, delta: &StructureDelta, fraction: f64) -> Structure {
        let lattice = [
            self.lattice[0] + delta.lattice[0] * fraction,
            self.lattice[1] + delta.lattice[1] * fraction,
            self.lattice[2] + delta.lattice[2] * fraction,
        ];

        let positions = self
            .positions
            .iter()
            .zip(&delta.positions)
            .map(|(p, d)| p + d * fraction)
            .collect();

        Structure {
            comment: self.comment.clone(),
            scale: self.scale + delta.scale * fraction,
            lattice,
            species: self.species.clone(),
            coordinate_mode: self.coordinate_mode.clone(),
            positions,
        }
    }
}

impl StructureDelta {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn lattice(&self) -> &[Vector3<f64>; 3] {
        &self.lattice
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }
}

fn wrap_fractional(delta: f64) -> f64 {
    if delta > WRAP_THRESHOLD {
        delta - 1.0
    } else if delta < -WRAP_THRESHOLD {
        delta + 1.0
    } else {
        delta
    }
}

fn format_species(species: &[SpeciesBlock]) -> String {
    species
        .iter()
        .map(|s| format!("{}:{}", s.symbol, s.count))
        .collect::<Vec<_>>()
        .join(" ")
}
