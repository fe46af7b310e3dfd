use ktkb_common::{KeyState, time::Instant};

use crate::{keys::Action, layers::LayerState};

/// Position of a key in the keymap grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A change in the state of a physical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub pos: KeyPos,
    pub state: KeyState,
    pub time: Instant,
}

impl KeyEvent {
    pub const fn press(row: u8, col: u8, time: Instant) -> Self {
        Self { pos: KeyPos::new(row, col), state: KeyState::Pressed, time }
    }

    pub const fn release(row: u8, col: u8, time: Instant) -> Self {
        Self { pos: KeyPos::new(row, col), state: KeyState::Released, time }
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct LayerRow<C, const COLS: usize> {
    row: [Action<C>; COLS],
}

impl<C, const COLS: usize> LayerRow<C, COLS> {
    pub const fn new(row: [Action<C>; COLS]) -> Self {
        Self { row }
    }

    pub fn actions(&self) -> &[Action<C>; COLS] {
        &self.row
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutLayer<C, const ROWS: usize, const COLS: usize> {
    name: &'static str,
    rows: [LayerRow<C, COLS>; ROWS],
}

impl<C, const ROWS: usize, const COLS: usize> LayoutLayer<C, ROWS, COLS> {
    pub const fn new(name: &'static str, rows: [LayerRow<C, COLS>; ROWS]) -> Self {
        Self { name, rows }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn rows(&self) -> &[LayerRow<C, COLS>; ROWS] {
        &self.rows
    }
}

impl<C: Copy, const ROWS: usize, const COLS: usize> LayoutLayer<C, ROWS, COLS> {
    pub fn action(&self, pos: KeyPos) -> Option<Action<C>> {
        self.rows
            .get(pos.row as usize)
            .and_then(|row| row.row.get(pos.col as usize))
            .copied()
    }
}

/// The whole set of layers of a keyboard.
#[derive(Clone, Copy, Debug)]
pub struct Keymap<C, const LAYERS: usize, const ROWS: usize, const COLS: usize> {
    layers: [LayoutLayer<C, ROWS, COLS>; LAYERS],
}

impl<C, const LAYERS: usize, const ROWS: usize, const COLS: usize> Keymap<C, LAYERS, ROWS, COLS> {
    const fn assert_config_ok() {
        assert!(LAYERS > 0, "There must be at least 1 layer in the keymap!");
        assert!(
            LAYERS <= LayerState::MAX_LAYERS as usize,
            "A keymap cannot hold more than 32 layers"
        );
        assert!(ROWS <= u8::MAX as usize, "Too many rows");
        assert!(COLS <= u8::MAX as usize, "Too many columns");
    }

    pub const fn new(layers: [LayoutLayer<C, ROWS, COLS>; LAYERS]) -> Self {
        const { Self::assert_config_ok() };

        Self { layers }
    }

    pub const fn layer_count(&self) -> usize {
        LAYERS
    }

    pub fn layers(&self) -> &[LayoutLayer<C, ROWS, COLS>; LAYERS] {
        &self.layers
    }

    pub fn layer(&self, index: u8) -> Option<&LayoutLayer<C, ROWS, COLS>> {
        self.layers.get(index as usize)
    }

    pub fn layer_name(&self, index: u8) -> Option<&'static str> {
        self.layer(index).map(|l| l.name)
    }

    pub fn layer_index(&self, name: &str) -> Option<u8> {
        self.layers.iter().position(|l| l.name == name).map(|i| i as u8)
    }

    pub fn contains(&self, pos: KeyPos) -> bool {
        (pos.row as usize) < ROWS && (pos.col as usize) < COLS
    }
}

impl<C: Copy, const LAYERS: usize, const ROWS: usize, const COLS: usize> Keymap<C, LAYERS, ROWS, COLS> {
    /// The action defined at `pos` on the given layer, without
    /// resolving transparency.
    pub fn action(&self, layer: u8, pos: KeyPos) -> Option<Action<C>> {
        self.layer(layer).and_then(|l| l.action(pos))
    }

    /// Finds the action of the key at `pos`, looking at the active
    /// layers from the highest to the lowest and skipping transparent
    /// keys. Returns the layer the action was taken from.
    pub fn resolve(&self, active: LayerState, pos: KeyPos) -> (u8, Action<C>) {
        for layer in active.iter_desc() {
            match self.action(layer, pos) {
                None | Some(Action::Transparent) => continue,
                Some(action) => return (layer, action),
            }
        }

        (0, Action::NoOp)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::hid::KeyCode;

    type TestKeymap = Keymap<(), 3, 1, 2>;

    const KEYMAP: TestKeymap = Keymap::new([
        LayoutLayer::new("base", [LayerRow::new([Action::Key(KeyCode::A), Action::Key(KeyCode::B)])]),
        LayoutLayer::new("mid", [LayerRow::new([Action::Transparent, Action::Key(KeyCode::C)])]),
        LayoutLayer::new("top", [LayerRow::new([Action::Transparent, Action::Transparent])]),
    ]);

    #[test]
    fn test_resolve_highest_wins() {
        let active = LayerState::only(0).on(1);
        assert_eq!(KEYMAP.resolve(active, KeyPos::new(0, 1)), (1, Action::Key(KeyCode::C)));
    }

    #[test]
    fn test_resolve_falls_through_transparent() {
        let active = LayerState::only(0).on(1).on(2);
        assert_eq!(KEYMAP.resolve(active, KeyPos::new(0, 0)), (0, Action::Key(KeyCode::A)));
    }

    #[test]
    fn test_resolve_skips_inactive_layers() {
        let active = LayerState::only(2);
        assert_eq!(KEYMAP.resolve(active, KeyPos::new(0, 1)), (0, Action::NoOp));
    }

    #[test]
    fn test_resolve_out_of_bounds() {
        let active = LayerState::only(0);
        assert_eq!(KEYMAP.resolve(active, KeyPos::new(3, 0)), (0, Action::NoOp));
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(KEYMAP.layer_index("mid"), Some(1));
        assert_eq!(KEYMAP.layer_index("nope"), None);
        assert_eq!(KEYMAP.layer_name(2), Some("top"));
        assert_eq!(KEYMAP.layer_name(3), None);
    }
}
