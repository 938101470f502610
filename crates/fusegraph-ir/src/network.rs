//! Linear-optical networks.
//!
//! A [`Network`] is an ordered list of optical elements over a fixed number
//! of spatial modes. Sub-networks are composed by [`Network::append`], which
//! flattens the sub-network into the parent at a mode offset and records a
//! named [`Segment`] so listings stay readable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::element::OpticalElement;
use crate::error::{IrError, IrResult};

/// An element placed on consecutive modes starting at `first_mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// First spatial mode the element acts on.
    pub first_mode: usize,
    /// The element.
    pub element: OpticalElement,
}

impl Placement {
    /// Spatial modes covered by the element.
    pub fn modes(&self) -> Range<usize> {
        self.first_mode..self.first_mode + self.element.num_modes()
    }
}

/// A named sub-network that was appended into a parent network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Name of the sub-network.
    pub name: String,
    /// Modes occupied in the parent.
    pub modes: Range<usize>,
    /// Indices of the placements contributed by the sub-network.
    pub placements: Range<usize>,
}

/// A linear-optical network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    name: String,
    num_modes: usize,
    placements: Vec<Placement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    segments: Vec<Segment>,
}

impl Network {
    /// Create an empty network over `num_modes` spatial modes.
    pub fn new(name: impl Into<String>, num_modes: usize) -> Self {
        Self {
            name: name.into(),
            num_modes,
            placements: vec![],
            segments: vec![],
        }
    }

    /// Place an element whose first mode is `mode`.
    pub fn add(&mut self, mode: usize, element: OpticalElement) -> IrResult<&mut Self> {
        let end = mode + element.num_modes();
        if end > self.num_modes {
            return Err(IrError::ModeOutOfRange {
                element: element.name().to_string(),
                start: mode,
                end,
                num_modes: self.num_modes,
            });
        }
        self.placements.push(Placement {
            first_mode: mode,
            element,
        });
        Ok(self)
    }

    // =========================================================================
    // Element shorthands
    // =========================================================================

    /// Apply a half-wave plate.
    pub fn hwp(&mut self, mode: usize, xsi: f64) -> IrResult<&mut Self> {
        self.add(mode, OpticalElement::hwp(xsi))
    }

    /// Apply a quarter-wave plate.
    pub fn qwp(&mut self, mode: usize, xsi: f64) -> IrResult<&mut Self> {
        self.add(mode, OpticalElement::qwp(xsi))
    }

    /// Apply a polarizing beam splitter on `mode` and `mode + 1`.
    pub fn pbs(&mut self, mode: usize) -> IrResult<&mut Self> {
        self.add(mode, OpticalElement::pbs())
    }

    /// Append a full-width identity permutation marking a stage boundary.
    pub fn barrier(&mut self) -> &mut Self {
        self.placements.push(Placement {
            first_mode: 0,
            element: OpticalElement::identity(self.num_modes),
        });
        self
    }

    /// Flatten `sub` into this network, shifting its modes by `offset`.
    pub fn append(&mut self, offset: usize, sub: &Network) -> IrResult<&mut Self> {
        let end = offset + sub.num_modes;
        if end > self.num_modes {
            return Err(IrError::ModeOutOfRange {
                element: sub.name.clone(),
                start: offset,
                end,
                num_modes: self.num_modes,
            });
        }
        let first = self.placements.len();
        self.placements
            .extend(sub.placements.iter().map(|p| Placement {
                first_mode: p.first_mode + offset,
                element: p.element.clone(),
            }));
        self.segments.push(Segment {
            name: sub.name.clone(),
            modes: offset..end,
            placements: first..self.placements.len(),
        });
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the network name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of spatial modes.
    pub fn num_modes(&self) -> usize {
        self.num_modes
    }

    /// Placed elements in application order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Named sub-networks appended so far.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of placed elements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Check whether the network has no elements.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Count elements with the given short name (`"PBS"`, `"WP"`, ...).
    pub fn count(&self, name: &str) -> usize {
        self.placements
            .iter()
            .filter(|p| p.element.name() == name)
            .count()
    }

    /// Number of stage barriers.
    pub fn num_barriers(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| p.element.is_barrier())
            .count()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network '{}': {} modes, {} elements",
            self.name,
            self.num_modes,
            self.placements.len()
        )?;
        let mut segments = self.segments.iter().peekable();
        for (idx, placement) in self.placements.iter().enumerate() {
            while let Some(seg) = segments.peek() {
                if seg.placements.start > idx {
                    break;
                }
                if !seg.placements.is_empty() {
                    writeln!(f, "  # {} [modes {}..{}]", seg.name, seg.modes.start, seg.modes.end)?;
                }
                segments.next();
            }
            let modes = placement.modes();
            writeln!(f, "  {:>4}  {:>3}..{:<3} {}", idx, modes.start, modes.end, placement.element)?;
        }
        Ok(())
    }
}
