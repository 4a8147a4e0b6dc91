//! Interned, reduced aspect ratios.
//!
//! A ratio is always stored reduced by the gcd of its components, and the
//! process keeps exactly one instance per reduced pair. Equal ratios are
//! therefore also pointer-equal, which makes them cheap map keys.

use super::Size;
use crate::error::CameraError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, PoisonError};

#[derive(Debug)]
struct Ratio {
    x: u32,
    y: u32,
}

/// Process-wide intern table keyed by the reduced pair.
static CACHE: OnceLock<Mutex<HashMap<(u32, u32), &'static Ratio>>> = OnceLock::new();

/// A reduced `x:y` aspect ratio.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio(&'static Ratio);

impl AspectRatio {
    /// Returns the interned ratio for `x:y`, reduced by their gcd.
    ///
    /// Both components must be at least 1.
    pub fn of(x: u32, y: u32) -> Result<Self, CameraError> {
        if x == 0 || y == 0 {
            return Err(CameraError::InvalidArgument(format!(
                "aspect ratio components must be positive: {x}:{y}"
            )));
        }
        let divisor = gcd(x, y);
        Ok(Self::intern(x / divisor, y / divisor))
    }

    /// Returns the ratio of a size, or `None` when a dimension is zero.
    pub fn of_size(size: &Size) -> Option<Self> {
        Self::of(size.width(), size.height()).ok()
    }

    /// Parses the canonical `"X:Y"` form.
    pub fn parse(s: &str) -> Result<Self, CameraError> {
        let (x, y) = s
            .split_once(':')
            .ok_or_else(|| CameraError::InvalidArgument(format!("malformed aspect ratio: {s:?}")))?;
        let parse_component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| CameraError::InvalidArgument(format!("malformed aspect ratio: {s:?}")))
        };
        Self::of(parse_component(x)?, parse_component(y)?)
    }

    fn intern(x: u32, y: u32) -> Self {
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut table = cache.lock().unwrap_or_else(PoisonError::into_inner);
        let ratio = *table
            .entry((x, y))
            .or_insert_with(|| Box::leak(Box::new(Ratio { x, y })));
        Self(ratio)
    }

    /// Reduced numerator.
    #[inline]
    pub fn x(&self) -> u32 {
        self.0.x
    }

    /// Reduced denominator.
    #[inline]
    pub fn y(&self) -> u32 {
        self.0.y
    }

    /// Returns true if `size` reduces to this ratio.
    pub fn matches(&self, size: &Size) -> bool {
        if !size.is_valid() {
            return false;
        }
        let divisor = gcd(size.width(), size.height());
        size.width() / divisor == self.0.x && size.height() / divisor == self.0.y
    }

    /// Returns `x / y`.
    pub fn to_float(&self) -> f32 {
        self.0.x as f32 / self.0.y as f32
    }

    /// Returns the `y:x` ratio.
    pub fn inverse(&self) -> Self {
        Self::intern(self.0.y, self.0.x)
    }

    /// Returns true if both handles point at the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Default for AspectRatio {
    /// `4:3`, the native ratio of most sensors.
    fn default() -> Self {
        Self::intern(4, 3)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl PartialEq for AspectRatio {
    fn eq(&self, other: &Self) -> bool {
        self.0.x == other.0.x && self.0.y == other.0.y
    }
}

impl Eq for AspectRatio {}

impl Hash for AspectRatio {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.x.hash(state);
        self.0.y.hash(state);
    }
}

impl Ord for AspectRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        // Exact comparison of x1/y1 against x2/y2.
        let lhs = u64::from(self.0.x) * u64::from(other.0.y);
        let rhs = u64::from(other.0.x) * u64::from(self.0.y);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for AspectRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.x, self.0.y)
    }
}

impl fmt::Debug for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AspectRatio({}:{})", self.0.x, self.0.y)
    }
}

impl FromStr for AspectRatio {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = CameraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.to_string()
    }
}
