/// Number of available layer channels.
pub const LAYER_COUNT: u8 = 32;

/// A bitmask of the layers a node belongs to. Nodes are members of layer 0 by default.
///
/// All channel arguments must be less than [`LAYER_COUNT`], otherwise the call panics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Layers {
    mask: u32,
}

impl Layers {
    pub fn new() -> Self {
        Self { mask: 1 }
    }

    /// Returns a mask with only `channel` enabled.
    pub fn channel(channel: u8) -> Self {
        Self {
            mask: channel_bit(channel),
        }
    }

    /// Returns a mask with no channels enabled.
    pub fn none() -> Self {
        Self { mask: 0 }
    }

    /// Sets membership to `channel` only.
    pub fn set(&mut self, channel: u8) {
        self.mask = channel_bit(channel);
    }

    pub fn enable(&mut self, channel: u8) {
        self.mask |= channel_bit(channel);
    }

    pub fn disable(&mut self, channel: u8) {
        self.mask &= !channel_bit(channel);
    }

    pub fn toggle(&mut self, channel: u8) {
        self.mask ^= channel_bit(channel);
    }

    pub fn enable_all(&mut self) {
        self.mask = u32::MAX;
    }

    pub fn disable_all(&mut self) {
        self.mask = 0;
    }

    pub fn is_enabled(&self, channel: u8) -> bool {
        self.mask & channel_bit(channel) != 0
    }

    /// Returns true if `self` and `other` share at least one channel.
    pub fn test(&self, other: &Layers) -> bool {
        self.mask & other.mask != 0
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Builder style version of [`Layers::enable`].
    pub fn with(mut self, channel: u8) -> Self {
        self.enable(channel);
        self
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::new()
    }
}

fn channel_bit(channel: u8) -> u32 {
    assert!(
        channel < LAYER_COUNT,
        "Layer channel {} out of range 0..{}",
        channel,
        LAYER_COUNT
    );
    1 << channel
}
