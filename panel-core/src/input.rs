//! Raw input sampling trait and source identifiers.

/// Stable identifier for one physical input, resolved by an [`InputSource`].
///
/// The value is opaque to the core: an implementation may treat it as a GPIO
/// index, a shift-register position, or a packed port/mask pair. It only has
/// to be stable for the lifetime of the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceId(pub u16);

/// Trait for raw panel input sampling.
///
/// This trait abstracts how switch levels are obtained, so the rest of the
/// pipeline never branches on port or pin identity. Implementations exist for
/// GPIO banks on hardware and for scripted mocks in tests.
///
/// # Contract
///
/// `sample` is called once per button per scheduling tick and must be
/// side-effect free and non-blocking.
pub trait InputSource {
    /// Read the instantaneous state of one input.
    ///
    /// Returns `true` when the switch is physically closed.
    fn sample(&mut self, id: SourceId) -> bool;
}
