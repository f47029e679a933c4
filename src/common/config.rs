//! Configuration for mwtree.

use crate::common::{Error, Result};

/// Smallest degree (maximum children per node) a tree may be built with.
///
/// Below order 3 there is no split that leaves both siblings non-empty
/// while still promoting a key, so construction rejects it.
pub const MIN_DEGREE: usize = 3;

/// Degree used by [`TreeConfig::default`].
///
/// Order 4 gives nodes of 1..=3 keys (a 2-3-4 tree).
pub const DEFAULT_DEGREE: usize = 4;

/// Validated tree shape parameters.
///
/// All occupancy bounds derive from `degree` (m) with integer division:
///
/// | bound          | value     |
/// |----------------|-----------|
/// | `min_keys`     | m/2 - 1   |
/// | `max_keys`     | m - 1     |
/// | `min_children` | m/2       |
/// | `max_children` | m         |
///
/// # Example
/// ```
/// use mwtree::TreeConfig;
///
/// let config = TreeConfig::new(5).unwrap();
/// assert_eq!(config.max_keys(), 4);
/// assert_eq!(config.min_keys(), 1);
/// assert!(TreeConfig::new(2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    degree: usize,
}

impl TreeConfig {
    /// Create a config for a tree of the given degree.
    ///
    /// # Errors
    /// - `Error::InvalidDegree` if `degree < MIN_DEGREE`
    pub fn new(degree: usize) -> Result<Self> {
        if degree < MIN_DEGREE {
            return Err(Error::InvalidDegree {
                degree,
                min: MIN_DEGREE,
            });
        }
        Ok(Self { degree })
    }

    /// Maximum number of children per node (m).
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub fn min_keys(&self) -> usize {
        self.degree / 2 - 1
    }

    #[inline]
    pub fn max_keys(&self) -> usize {
        self.degree - 1
    }

    #[inline]
    pub fn min_children(&self) -> usize {
        self.degree / 2
    }

    #[inline]
    pub fn max_children(&self) -> usize {
        self.degree
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
        }
    }
}
