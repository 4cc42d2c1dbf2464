//! Material phase designators for grid cells

/// Material phase occupying a grid cell
///
/// The surrounding growth simulation stores cells as signed integer codes.
/// Negative codes are fully solid, anything else is void or a partially
/// filled surface cell still being grown.
///
/// | Code  | Phase               |
/// | ----- | ------------------- |
/// | -2    | [Phase::Substrate]  |
/// | -1    | [Phase::Deposit]    |
/// | >= 0  | [Phase::Void]       |
///
/// ```rust
/// # use etmap_grid::Phase;
/// assert_eq!(Phase::from_code(-2), Phase::Substrate);
/// assert_eq!(Phase::from_code(-1), Phase::Deposit);
///
/// // Partially filled cells are not solid
/// assert_eq!(Phase::from_code(0), Phase::Void);
/// assert_eq!(Phase::from_code(1), Phase::Void);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Substrate the structure is grown on
    Substrate,
    /// Fully deposited material
    Deposit,
    /// Vacuum or not yet filled cell
    #[default]
    Void,
}

impl Phase {
    /// Integer code used by the growth simulation
    ///
    /// ```rust
    /// # use etmap_grid::Phase;
    /// assert_eq!(Phase::Substrate.code(), -2);
    /// assert_eq!(Phase::Void.code(), 0);
    /// ```
    #[inline]
    pub const fn code(&self) -> i8 {
        match self {
            Self::Substrate => -2,
            Self::Deposit => -1,
            Self::Void => 0,
        }
    }

    /// Interpret an integer cell code, anything unrecognised is [Phase::Void]
    pub const fn from_code(code: i8) -> Self {
        match code {
            -2 => Self::Substrate,
            -1 => Self::Deposit,
            _ => Self::Void,
        }
    }

    /// True for the phases that carry [Material](crate::Material) parameters
    #[inline]
    pub const fn is_solid(&self) -> bool {
        matches!(*self, Self::Substrate | Self::Deposit)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::Substrate => "Substrate",
            Self::Deposit => "Deposit",
            Self::Void => "Void",
        };
        write!(f, "{s}")
    }
}
