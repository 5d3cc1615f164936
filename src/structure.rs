//! Connection-table (MDL molfile / SDF, V2000) parsing.
//!
//! Only the first record of an SDF file is read. Parsing is strict: a
//! structure that cannot be read in full is an error rather than a
//! partially populated molecule, so the viewer never shows half a model.

use std::fmt;

use glam::Vec3;

/// Bond multiplicity from the bond block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    /// Type 1.
    Single,
    /// Type 2.
    Double,
    /// Type 3.
    Triple,
    /// Type 4.
    Aromatic,
    /// Query and other types (5-8).
    Other,
}

impl BondOrder {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            5..=8 => Some(Self::Other),
            _ => None,
        }
    }
}

/// One atom of the atom block.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Element symbol as written (e.g. `"C"`, `"Cl"`).
    pub element: String,
    /// Position in angstroms.
    pub position: Vec3,
}

/// One bond of the bond block, with zero-based atom indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    /// First atom index.
    pub a: usize,
    /// Second atom index.
    pub b: usize,
    /// Bond multiplicity.
    pub order: BondOrder,
}

/// A parsed molecule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Molecule {
    /// Header line 1 (for PubChem records, the CID).
    pub name: String,
    /// Atom block.
    pub atoms: Vec<Atom>,
    /// Bond block.
    pub bonds: Vec<Bond>,
}

impl Molecule {
    /// Parse the first record of an SDF/molfile.
    ///
    /// # Errors
    ///
    /// Returns [`StructureParseError`] on a missing header, an unreadable
    /// counts line, a V3000 table, or a malformed atom or bond line.
    pub fn from_sdf(text: &str) -> Result<Self, StructureParseError> {
        let lines: Vec<&str> = text
            .lines()
            .take_while(|line| !line.starts_with("$$$$"))
            .collect();
        if lines.len() < 4 {
            return Err(StructureParseError::new(
                lines.len() + 1,
                "missing molfile header",
            ));
        }

        let counts = lines[3];
        if counts.contains("V3000") {
            return Err(StructureParseError::new(4, "V3000 is not supported"));
        }
        let n_atoms = fixed_field::<usize>(counts, 0..3)
            .ok_or_else(|| StructureParseError::new(4, "bad atom count"))?;
        let n_bonds = fixed_field::<usize>(counts, 3..6)
            .ok_or_else(|| StructureParseError::new(4, "bad bond count"))?;
        if n_atoms == 0 {
            return Err(StructureParseError::new(4, "structure has no atoms"));
        }

        let atom_start = 4;
        let bond_start = atom_start + n_atoms;
        if lines.len() < bond_start + n_bonds {
            return Err(StructureParseError::new(
                lines.len() + 1,
                "unexpected end of connection table",
            ));
        }

        let atoms = lines[atom_start..bond_start]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line_no = atom_start + i + 1;
                parse_atom(line).ok_or_else(|| {
                    StructureParseError::new(line_no, "bad atom line")
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bonds = lines[bond_start..bond_start + n_bonds]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line_no = bond_start + i + 1;
                parse_bond(line, n_atoms).ok_or_else(|| {
                    StructureParseError::new(line_no, "bad bond line")
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: lines[0].trim().to_owned(),
            atoms,
            bonds,
        })
    }

    /// Atom positions in atom-block order.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// Hill-ordered formula from the atom block, e.g. `C9H8O4`.
    #[must_use]
    pub fn formula(&self) -> String {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for atom in &self.atoms {
            match counts.iter_mut().find(|(el, _)| *el == atom.element) {
                Some((_, n)) => *n += 1,
                None => counts.push((atom.element.as_str(), 1)),
            }
        }
        let has_carbon = counts.iter().any(|(el, _)| *el == "C");
        counts.sort_by(|(a, _), (b, _)| {
            hill_rank(a, has_carbon)
                .cmp(&hill_rank(b, has_carbon))
                .then_with(|| a.cmp(b))
        });
        counts
            .iter()
            .map(|(el, n)| {
                if *n == 1 {
                    (*el).to_owned()
                } else {
                    format!("{el}{n}")
                }
            })
            .collect()
    }
}

fn hill_rank(element: &str, has_carbon: bool) -> u8 {
    match (has_carbon, element) {
        (true, "C") => 0,
        (true, "H") => 1,
        _ => 2,
    }
}

/// Parse a right-aligned fixed-width column.
fn fixed_field<T: std::str::FromStr>(
    line: &str,
    cols: std::ops::Range<usize>,
) -> Option<T> {
    line.get(cols)?.trim().parse().ok()
}

// Atom line: xxxxx.xxxxyyyyy.yyyyzzzzz.zzzz aaa...
fn parse_atom(line: &str) -> Option<Atom> {
    let x = fixed_field::<f32>(line, 0..10)?;
    let y = fixed_field::<f32>(line, 10..20)?;
    let z = fixed_field::<f32>(line, 20..30)?;
    let element = line.get(31..34)?.trim();
    if element.is_empty() || !element.chars().all(char::is_alphabetic) {
        return None;
    }
    Some(Atom {
        element: element.to_owned(),
        position: Vec3::new(x, y, z),
    })
}

// Bond line: 111222tttsss..., atom numbers are one-based.
fn parse_bond(line: &str, n_atoms: usize) -> Option<Bond> {
    let a = fixed_field::<usize>(line, 0..3)?;
    let b = fixed_field::<usize>(line, 3..6)?;
    let order = BondOrder::from_code(fixed_field::<u8>(line, 6..9)?)?;
    let in_range = |i: usize| (1..=n_atoms).contains(&i);
    if !in_range(a) || !in_range(b) || a == b {
        return None;
    }
    Some(Bond {
        a: a - 1,
        b: b - 1,
        order,
    })
}

/// Where and why a connection table could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureParseError {
    /// One-based line number.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

impl StructureParseError {
    fn new(line: usize, message: &str) -> Self {
        Self {
            line,
            message: message.to_owned(),
        }
    }
}

impl fmt::Display for StructureParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for StructureParseError {}
