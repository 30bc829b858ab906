use core::fmt;

/// The requested key is not present in the map.
///
/// Returned by [`HashMap::at`] and [`HashMap::at_mut`]. The map is left
/// untouched when this error is produced.
///
/// [`HashMap::at`]: crate::HashMap::at
/// [`HashMap::at_mut`]: crate::HashMap::at_mut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found in map")
    }
}

impl core::error::Error for KeyNotFound {}
