use heapless::Vec;
use ktkb_common::{KeyState, dev_debug, dev_info, dev_trace, dev_warn, time::Instant, util::BitMatrix};

use crate::{
    backlight::Backlight,
    board::Board,
    config::KeyboardConfig,
    eeconfig::{EeConfig, read_config, reset_config, write_config},
    hid::{ConsumerReport, KeyCode, KeyboardReport, Mods, Report, ascii_to_key},
    indicators::IndicatorSet,
    keymap::{KeyEvent, KeyPos, Keymap},
    keys::{Action, ActivateOn, FirmwareAction, LayerAction},
    layers::LayerState,
    mouse::MouseKeys,
    report::{KeyboardReportState, ReportQueue},
    rgb::{Rgb, RgbLight},
};

/// Events that can wait behind an undecided tap-hold key.
pub const PENDING_EVENTS: usize = 16;
pub const MAX_ACTIVE_KEYS: usize = 32;

const MUSIC_MODES: u8 = 4;
const VOICES: u8 = 8;

/// Operations the keymap hooks can perform on the keyboard. The trait
/// is object safe so hooks don't need to know the keyboard type.
pub trait KeyboardOps {
    fn layer_state(&self) -> LayerState;
    fn default_layer_state(&self) -> LayerState;
    fn layer_on(&mut self, layer: u8);
    fn layer_off(&mut self, layer: u8);
    fn layer_invert(&mut self, layer: u8);
    /// Leaves `layer` as the only active one.
    fn layer_move(&mut self, layer: u8);
    fn layer_clear(&mut self);
    /// Turns `third` on when both `first` and `second` are on, off
    /// otherwise.
    fn update_tri_layer(&mut self, first: u8, second: u8, third: u8);
    fn default_layer_set(&mut self, layer: u8);
    /// Like [`KeyboardOps::default_layer_set`], also stored in the
    /// EEPROM.
    fn set_single_persistent_default_layer(&mut self, layer: u8);

    fn register_code(&mut self, key: KeyCode);
    fn unregister_code(&mut self, key: KeyCode);
    fn tap_code(&mut self, key: KeyCode);
    /// Types an ASCII string. Characters with no key on a US layout
    /// are skipped.
    fn send_string(&mut self, s: &str);

    fn set_indicators(&mut self, leds: IndicatorSet);
    fn rgb_setrgb(&mut self, color: Rgb);
    fn rgb_mode(&mut self, mode: u8);
    fn backlight_step(&mut self);

    fn eeconfig(&self) -> &EeConfig;
    fn eeconfig_reset(&mut self);
    fn now(&self) -> Instant;
}

/// Behaviour a keymap adds on top of the built in actions.
pub trait KeymapHooks<C> {
    fn init(&mut self, _ops: &mut dyn KeyboardOps) {}

    /// Called on press and on release of every custom key.
    fn process_custom(&mut self, key: C, state: KeyState, ops: &mut dyn KeyboardOps);

    /// Called once after any change of the active layers, with the new
    /// state. The returned state replaces it.
    fn layer_state_changed(&mut self, state: LayerState, _ops: &mut dyn KeyboardOps) -> LayerState {
        state
    }

    fn default_layer_changed(&mut self, _state: LayerState, _ops: &mut dyn KeyboardOps) {}
}

impl<C> KeymapHooks<C> for () {
    fn process_custom(&mut self, _key: C, _state: KeyState, _ops: &mut dyn KeyboardOps) {}
}

#[derive(Clone, Copy, Debug)]
struct ActiveKey<C> {
    pos: KeyPos,
    action: Action<C>,
    pressed_at: Instant,
}

#[derive(Clone, Copy, Debug)]
struct PendingKey<C> {
    pos: KeyPos,
    action: Action<C>,
    since: Instant,
}

#[derive(Clone, Copy, Debug, Default)]
struct TapCounter {
    pos: Option<KeyPos>,
    count: u8,
    last_tap: Instant,
}

const fn tap_key<C>(action: &Action<C>) -> Option<KeyCode> {
    match action {
        Action::ModTap(_, key) | Action::Layer(LayerAction::LayerTap(_, key)) => Some(*key),
        _ => None,
    }
}

struct KeyboardCore<'k, C, B, const LAYERS: usize, const ROWS: usize, const COLS: usize> {
    keymap: &'k Keymap<C, LAYERS, ROWS, COLS>,
    config: KeyboardConfig,
    board: B,
    now: Instant,

    layer_state: LayerState,
    default_layer_state: LayerState,
    /// States last notified to the hooks.
    synced_layer_state: LayerState,
    synced_default_layer_state: LayerState,

    pressed: BitMatrix<ROWS>,
    active: Vec<ActiveKey<C>, MAX_ACTIVE_KEYS>,
    pending: Option<PendingKey<C>>,
    buffered: Vec<KeyEvent, PENDING_EVENTS>,
    tap_counter: TapCounter,

    report_state: KeyboardReportState,
    last_keyboard_report: KeyboardReport,
    queue: ReportQueue,

    mouse: MouseKeys,
    rgb: RgbLight,
    backlight: Backlight,
    eeconfig: EeConfig,
}

impl<'k, C: Copy, B: Board, const LAYERS: usize, const ROWS: usize, const COLS: usize>
    KeyboardCore<'k, C, B, LAYERS, ROWS, COLS>
{
    fn effective_layers(&self) -> LayerState {
        self.layer_state.union(self.default_layer_state)
    }

    fn layer_in_range(&self, layer: u8) -> bool {
        if (layer as usize) < LAYERS {
            true
        } else {
            dev_warn!("Layer {} does not exist", layer);
            false
        }
    }

    fn send_keyboard_report(&mut self) {
        let report = self.report_state.report();
        if report != self.last_keyboard_report {
            self.last_keyboard_report = report;
            self.queue.push(Report::Keyboard(report));
        }
    }

    fn save_config(&mut self) {
        match write_config(self.board.eeprom(), &self.eeconfig) {
            Ok(()) => {}
            #[allow(unused_variables)]
            Err(e) => dev_warn!("Unable to persist config: {}", e),
        }
    }

    /// Pushes the persisted settings to the peripherals.
    fn apply_config(&mut self) {
        let layer = if (self.eeconfig.default_layer as usize) < LAYERS { self.eeconfig.default_layer } else { 0 };
        self.default_layer_state = LayerState::only(layer);
        self.rgb.restore(self.eeconfig.rgb, &mut self.board);
        self.backlight.set_level(self.eeconfig.backlight.level, &mut self.board);
        self.report_state.set_swap_alt_gui(self.eeconfig.keymap.swap_alt_gui);
    }

    fn load_config(&mut self) {
        self.eeconfig = match read_config(self.board.eeprom()) {
            Ok(config) => config,
            #[allow(unused_variables)]
            Err(e) => {
                dev_info!("Persisted config unusable ({}), restoring defaults", e);
                match reset_config(self.board.eeprom()) {
                    Ok(config) => config,
                    #[allow(unused_variables)]
                    Err(e) => {
                        dev_warn!("Unable to reset persisted config: {}", e);
                        EeConfig::new()
                    }
                }
            }
        };
        self.apply_config();
    }

    fn handle_event<U: KeymapHooks<C>>(&mut self, event: KeyEvent, hooks: &mut U) {
        if !self.keymap.contains(event.pos) {
            dev_warn!("Event out of the keymap: {:?}", event);
            return;
        }

        if !self.pressed.set_value(event.pos.row as usize, event.pos.col, event.state.is_pressed()) {
            dev_trace!("Ignoring repeated event {:?}", event);
            return;
        }

        self.dispatch(event, hooks);
    }

    fn dispatch<U: KeymapHooks<C>>(&mut self, event: KeyEvent, hooks: &mut U) {
        let Some(pending) = self.pending else {
            return self.process_key(event, hooks);
        };

        let th = self.config.tap_hold;
        if event.time.has_elapsed(pending.since, th.tapping_term) {
            self.resolve_hold(hooks);
            return self.dispatch(event, hooks);
        }

        if event.pos == pending.pos && !event.state.is_pressed() {
            self.resolve_tap(hooks);
            return;
        }

        if self.buffered.is_full() {
            self.resolve_hold(hooks);
            return self.dispatch(event, hooks);
        }

        let hold = match event.state {
            KeyState::Pressed => th.hold_on_other_key_press,
            KeyState::Released => {
                th.permissive_hold && self.buffered.iter().any(|e| e.pos == event.pos && e.state.is_pressed())
            }
        };
        let _ = self.buffered.push(event);

        if hold {
            self.resolve_hold(hooks);
        }
    }

    fn replay<U: KeymapHooks<C>>(&mut self, hooks: &mut U) {
        let events = core::mem::take(&mut self.buffered);
        for event in events {
            self.dispatch(event, hooks);
        }
    }

    fn resolve_hold<U: KeymapHooks<C>>(&mut self, hooks: &mut U) {
        let Some(p) = self.pending.take() else {
            return;
        };
        dev_debug!("Key {:?} resolved as hold", p.pos);

        if self.activate(ActiveKey { pos: p.pos, action: p.action, pressed_at: p.since }) {
            match p.action {
                Action::Layer(LayerAction::LayerTap(layer, _)) => self.layer_on(layer),
                Action::ModTap(mods, _) => {
                    self.report_state.register_mods(mods);
                    self.send_keyboard_report();
                }
                _ => {}
            }
        }
        self.replay(hooks);
    }

    fn resolve_tap<U: KeymapHooks<C>>(&mut self, hooks: &mut U) {
        let Some(p) = self.pending.take() else {
            return;
        };
        dev_debug!("Key {:?} resolved as tap", p.pos);

        if let Some(key) = tap_key(&p.action) {
            self.tap_code(key);
        }
        self.replay(hooks);
    }

    fn activate(&mut self, key: ActiveKey<C>) -> bool {
        if self.active.push(key).is_err() {
            dev_warn!("Too many keys held, ignoring {:?}", key.pos);
            return false;
        }
        true
    }

    fn process_key<U: KeymapHooks<C>>(&mut self, event: KeyEvent, hooks: &mut U) {
        match event.state {
            KeyState::Pressed => {
                #[allow(unused_variables)]
                let (layer, action) = self.keymap.resolve(self.effective_layers(), event.pos);
                dev_trace!("Press {:?} on layer {}", event.pos, layer);

                // Weak modifiers only apply to the key that added them.
                self.report_state.clear_weak_mods();

                if action.is_tap_hold() {
                    self.pending = Some(PendingKey { pos: event.pos, action, since: event.time });
                    return;
                }

                if self.activate(ActiveKey { pos: event.pos, action, pressed_at: event.time }) {
                    self.press_action(action, event, hooks);
                }
            }
            KeyState::Released => {
                let Some(idx) = self.active.iter().position(|k| k.pos == event.pos) else {
                    dev_trace!("Release of inactive key {:?}", event.pos);
                    return;
                };
                let key = self.active.swap_remove(idx);
                self.release_action(key, event, hooks);
            }
        }
    }

    fn press_action<U: KeymapHooks<C>>(&mut self, action: Action<C>, event: KeyEvent, hooks: &mut U) {
        match action {
            Action::NoOp | Action::Transparent | Action::ModTap(..) => {}
            Action::Key(key) => self.register_code(key),
            Action::Modified(mods, key) => {
                self.report_state.register_weak_mods(mods);
                self.register_code(key);
            }
            Action::Consumer(key) => self.queue.push(Report::Consumer(ConsumerReport::new(key.usage()))),
            Action::Mouse(key) => {
                if let Some(report) = self.mouse.press(key, event.time) {
                    self.queue.push(Report::Mouse(report));
                }
            }
            Action::Layer(layer_action) => self.press_layer(layer_action, event),
            Action::Rgb(rgb_action) => {
                self.rgb.handle(rgb_action, &mut self.board);
                self.eeconfig.rgb = self.rgb.config();
                self.save_config();
            }
            Action::Firmware(fw) => self.firmware(fw),
            Action::Custom(key) => hooks.process_custom(key, KeyState::Pressed, self),
        }
    }

    fn release_action<U: KeymapHooks<C>>(&mut self, key: ActiveKey<C>, event: KeyEvent, hooks: &mut U) {
        match key.action {
            Action::Key(code) => self.unregister_code(code),
            Action::Modified(mods, code) => {
                self.report_state.unregister_key(code);
                self.report_state.unregister_weak_mods(mods);
                self.send_keyboard_report();
            }
            Action::ModTap(mods, _) => {
                self.report_state.unregister_mods(mods);
                self.send_keyboard_report();
            }
            Action::Consumer(_) => self.queue.push(Report::Consumer(ConsumerReport::released())),
            Action::Mouse(mouse_key) => {
                if let Some(report) = self.mouse.release(mouse_key, event.time) {
                    self.queue.push(Report::Mouse(report));
                }
            }
            Action::Layer(layer_action) => self.release_layer(layer_action, key, event),
            Action::Custom(custom) => hooks.process_custom(custom, KeyState::Released, self),
            Action::NoOp | Action::Transparent | Action::Rgb(_) | Action::Firmware(_) => {}
        }
    }

    fn press_layer(&mut self, action: LayerAction, event: KeyEvent) {
        match action {
            LayerAction::Momentary(layer) => self.layer_on(layer),
            LayerAction::To(layer, ActivateOn::Press) => self.layer_move(layer),
            LayerAction::TapToggle(layer) => {
                let term = self.config.tap_hold.tapping_term;
                let consecutive = self.tap_counter.pos == Some(event.pos)
                    && !event.time.has_elapsed(self.tap_counter.last_tap, term);
                if !consecutive {
                    self.tap_counter = TapCounter { pos: Some(event.pos), count: 0, last_tap: event.time };
                }
                self.layer_invert(layer);
            }
            LayerAction::DefaultSet(layer) => self.default_layer_set(layer),
            LayerAction::Toggle(_) | LayerAction::To(_, ActivateOn::Release) | LayerAction::LayerTap(..) => {}
        }
    }

    fn release_layer(&mut self, action: LayerAction, key: ActiveKey<C>, event: KeyEvent) {
        match action {
            LayerAction::Momentary(layer) | LayerAction::LayerTap(layer, _) => self.layer_off(layer),
            LayerAction::Toggle(layer) => self.layer_invert(layer),
            LayerAction::To(layer, ActivateOn::Release) => self.layer_move(layer),
            LayerAction::TapToggle(layer) => {
                let th = self.config.tap_hold;
                let tapped = !event.time.has_elapsed(key.pressed_at, th.tapping_term);
                if tapped {
                    self.tap_counter.count = self.tap_counter.count.saturating_add(1);
                    self.tap_counter.last_tap = event.time;
                } else {
                    self.tap_counter.count = 0;
                }

                if tapped && self.tap_counter.count >= th.tapping_toggle {
                    dev_debug!("Layer {} locked after {} taps", layer, self.tap_counter.count);
                    self.tap_counter.count = 0;
                } else {
                    self.layer_invert(layer);
                }
            }
            LayerAction::To(_, ActivateOn::Press) | LayerAction::DefaultSet(_) => {}
        }
    }

    fn firmware(&mut self, action: FirmwareAction) {
        let c = &mut self.eeconfig;
        match action {
            FirmwareAction::Bootloader => {
                dev_info!("Jumping to bootloader");
                self.board.jump_to_bootloader();
                return;
            }
            FirmwareAction::EepromReset => {
                self.eeconfig_reset();
                return;
            }
            FirmwareAction::DebugToggle => c.debug = !c.debug,
            FirmwareAction::AudioOn => c.audio.enabled = true,
            FirmwareAction::AudioOff => c.audio.enabled = false,
            FirmwareAction::MusicOn => c.audio.music = true,
            FirmwareAction::MusicOff => c.audio.music = false,
            FirmwareAction::MusicModeNext => c.audio.music_mode = c.audio.music_mode.wrapping_add(1) % MUSIC_MODES,
            FirmwareAction::MidiOn => c.audio.midi = true,
            FirmwareAction::MidiOff => c.audio.midi = false,
            FirmwareAction::VoiceUp => c.audio.voice = c.audio.voice.wrapping_add(1) % VOICES,
            FirmwareAction::VoiceDown => {
                c.audio.voice = if c.audio.voice == 0 { VOICES - 1 } else { (c.audio.voice - 1).min(VOICES - 1) };
            }
            FirmwareAction::TerminalOn => c.terminal = true,
            FirmwareAction::TerminalOff => c.terminal = false,
            FirmwareAction::AltGuiNormal | FirmwareAction::AltGuiSwap => {
                c.keymap.swap_alt_gui = action == FirmwareAction::AltGuiSwap;
                let swap = c.keymap.swap_alt_gui;
                self.report_state.set_swap_alt_gui(swap);
                self.send_keyboard_report();
            }
        }
        self.save_config();
    }

    fn check_pending_timeout<U: KeymapHooks<C>>(&mut self, hooks: &mut U) {
        if let Some(p) = self.pending {
            if self.now.has_elapsed(p.since, self.config.tap_hold.tapping_term) {
                self.resolve_hold(hooks);
            }
        }
    }

    fn sync_layers<U: KeymapHooks<C>>(&mut self, hooks: &mut U) {
        if self.default_layer_state != self.synced_default_layer_state {
            self.synced_default_layer_state = self.default_layer_state;
            hooks.default_layer_changed(self.default_layer_state, self);
        }

        if self.layer_state != self.synced_layer_state {
            dev_debug!("Layer state {} -> {}", self.synced_layer_state, self.layer_state);
            let state = hooks.layer_state_changed(self.layer_state, self);
            self.layer_state = state;
            self.synced_layer_state = state;
        }
    }

    fn flush(&mut self) {
        self.queue.flush(&mut self.board);
    }
}

impl<'k, C: Copy, B: Board, const LAYERS: usize, const ROWS: usize, const COLS: usize> KeyboardOps
    for KeyboardCore<'k, C, B, LAYERS, ROWS, COLS>
{
    fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    fn default_layer_state(&self) -> LayerState {
        self.default_layer_state
    }

    fn layer_on(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.layer_state = self.layer_state.on(layer);
        }
    }

    fn layer_off(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.layer_state = self.layer_state.off(layer);
        }
    }

    fn layer_invert(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.layer_state = self.layer_state.invert(layer);
        }
    }

    fn layer_move(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.layer_state = LayerState::only(layer);
        }
    }

    fn layer_clear(&mut self) {
        self.layer_state = LayerState::empty();
    }

    fn update_tri_layer(&mut self, first: u8, second: u8, third: u8) {
        if self.layer_in_range(third) {
            self.layer_state = self.layer_state.tri_layer(first, second, third);
        }
    }

    fn default_layer_set(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.default_layer_state = LayerState::only(layer);
        }
    }

    fn set_single_persistent_default_layer(&mut self, layer: u8) {
        if self.layer_in_range(layer) {
            self.default_layer_state = LayerState::only(layer);
            self.eeconfig.default_layer = layer;
            self.save_config();
        }
    }

    fn register_code(&mut self, key: KeyCode) {
        self.report_state.register_key(key);
        self.send_keyboard_report();
    }

    fn unregister_code(&mut self, key: KeyCode) {
        self.report_state.unregister_key(key);
        self.send_keyboard_report();
    }

    fn tap_code(&mut self, key: KeyCode) {
        self.register_code(key);
        self.unregister_code(key);
    }

    fn send_string(&mut self, s: &str) {
        for c in s.chars() {
            let Some((key, shifted)) = ascii_to_key(c) else {
                dev_warn!("Cannot type {:?}", c);
                continue;
            };

            if shifted {
                self.report_state.register_weak_mods(Mods::LSHIFT);
            }
            self.register_code(key);
            self.report_state.unregister_key(key);
            if shifted {
                self.report_state.unregister_weak_mods(Mods::LSHIFT);
            }
            self.send_keyboard_report();
        }
    }

    fn set_indicators(&mut self, leds: IndicatorSet) {
        self.board.set_indicators(leds);
    }

    fn rgb_setrgb(&mut self, color: Rgb) {
        self.rgb.setrgb(color, &mut self.board);
    }

    fn rgb_mode(&mut self, mode: u8) {
        self.rgb.set_mode(mode, &mut self.board);
        self.eeconfig.rgb = self.rgb.config();
        self.save_config();
    }

    fn backlight_step(&mut self) {
        self.backlight.step(&mut self.board);
        self.eeconfig.backlight.level = self.backlight.level();
        self.save_config();
    }

    fn eeconfig(&self) -> &EeConfig {
        &self.eeconfig
    }

    /// Only the stored block is reset; the running layers and lights
    /// pick it up on the next boot.
    fn eeconfig_reset(&mut self) {
        self.eeconfig = match reset_config(self.board.eeprom()) {
            Ok(config) => config,
            #[allow(unused_variables)]
            Err(e) => {
                dev_warn!("Unable to reset persisted config: {}", e);
                EeConfig::new()
            }
        };
    }

    fn now(&self) -> Instant {
        self.now
    }
}

/// A keyboard running a keymap on a board.
///
/// Key events come from [`Keyboard::process`], and time passing is
/// notified through [`Keyboard::tick`]. Both flush the produced reports
/// to the board and notify the hooks of layer changes before
/// returning.
pub struct Keyboard<'k, C, U, B, const LAYERS: usize, const ROWS: usize, const COLS: usize> {
    core: KeyboardCore<'k, C, B, LAYERS, ROWS, COLS>,
    hooks: U,
}

impl<'k, C, U, B, const LAYERS: usize, const ROWS: usize, const COLS: usize> Keyboard<'k, C, U, B, LAYERS, ROWS, COLS>
where
    C: Copy,
    U: KeymapHooks<C>,
    B: Board,
{
    const fn assert_config_ok() {
        assert!(COLS <= 32, "Keymaps cannot be wider than 32 columns");
    }

    pub fn new(
        keymap: &'k Keymap<C, LAYERS, ROWS, COLS>,
        config: KeyboardConfig,
        hooks: U,
        board: B,
        now: Instant,
    ) -> Self {
        const { Self::assert_config_ok() }

        Self {
            core: KeyboardCore {
                keymap,
                config,
                board,
                now,
                layer_state: LayerState::empty(),
                default_layer_state: LayerState::only(0),
                synced_layer_state: LayerState::empty(),
                synced_default_layer_state: LayerState::empty(),
                pressed: BitMatrix::new(),
                active: Vec::new(),
                pending: None,
                buffered: Vec::new(),
                tap_counter: TapCounter::default(),
                report_state: KeyboardReportState::new(),
                last_keyboard_report: KeyboardReport::default(),
                queue: ReportQueue::new(),
                mouse: MouseKeys::new(config.mouse),
                rgb: RgbLight::new(config.rgb),
                backlight: Backlight::new(config.backlight_levels),
                eeconfig: EeConfig::new(),
            },
            hooks,
        }
    }

    /// Loads the persisted settings and runs the keymap initialization.
    pub fn init(&mut self) {
        dev_info!("Initializing keyboard with {} layers", LAYERS);
        self.core.load_config();
        self.hooks.init(&mut self.core);
        self.core.sync_layers(&mut self.hooks);
        self.core.flush();
    }

    pub fn process(&mut self, event: KeyEvent) {
        dev_trace!("Key event {:?}", event);
        self.core.now = self.core.now.max(event.time);
        self.core.handle_event(event, &mut self.hooks);
        self.core.sync_layers(&mut self.hooks);
        self.core.flush();
    }

    pub fn tick(&mut self, now: Instant) {
        self.core.now = self.core.now.max(now);
        self.core.check_pending_timeout(&mut self.hooks);
        if let Some(report) = self.core.mouse.tick(self.core.now) {
            self.core.queue.push(Report::Mouse(report));
        }
        self.core.sync_layers(&mut self.hooks);
        self.core.flush();
    }

    pub fn layer_state(&self) -> LayerState {
        self.core.layer_state
    }

    pub fn default_layer_state(&self) -> LayerState {
        self.core.default_layer_state
    }

    /// Highest active layer, taking the default layer into account.
    pub fn current_layer(&self) -> u8 {
        self.core.effective_layers().highest()
    }

    pub fn keymap(&self) -> &'k Keymap<C, LAYERS, ROWS, COLS> {
        self.core.keymap
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.core.config
    }

    pub fn board(&self) -> &B {
        &self.core.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.core.board
    }

    pub fn hooks(&self) -> &U {
        &self.hooks
    }

    pub fn eeconfig(&self) -> &EeConfig {
        &self.core.eeconfig
    }

    pub fn rgb(&self) -> &RgbLight {
        &self.core.rgb
    }

    pub fn backlight(&self) -> &Backlight {
        &self.core.backlight
    }

    pub fn mods(&self) -> Mods {
        self.core.report_state.mods()
    }

    /// Whether a tap-hold key is still waiting to be resolved.
    pub fn is_pending(&self) -> bool {
        self.core.pending.is_some()
    }

    pub fn queued_reports(&self) -> usize {
        self.core.queue.len()
    }

    /// Direct access to the keyboard operations, as seen by the hooks.
    /// Layer changes done through it are notified on the next event or
    /// tick.
    pub fn ops(&mut self) -> &mut dyn KeyboardOps {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::time::Duration;

    use ktkb_common::do_on_key_state;

    use super::*;
    use crate::{
        config::TapHoldConfig,
        hid::{ConsumerKey, MouseReport},
        keymap::{LayerRow, LayoutLayer},
        keys::{MouseKey, RgbAction},
        sim::SimBoard,
    };

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum TestKey {
        Hello,
        Shift,
    }

    #[derive(Default)]
    struct TestHooks {
        layer_changes: std::vec::Vec<LayerState>,
        forced_layer: Option<u8>,
    }

    impl KeymapHooks<TestKey> for TestHooks {
        fn process_custom(&mut self, key: TestKey, state: KeyState, ops: &mut dyn KeyboardOps) {
            match key {
                TestKey::Hello => {
                    if state.is_pressed() {
                        ops.send_string("Hi!");
                    }
                }
                TestKey::Shift => do_on_key_state!(state, { ops.register_code(KeyCode::RightShift) }, {
                    ops.unregister_code(KeyCode::RightShift)
                }),
            }
        }

        fn layer_state_changed(&mut self, state: LayerState, ops: &mut dyn KeyboardOps) -> LayerState {
            self.layer_changes.push(state);
            ops.set_indicators(if state.highest() > 0 { IndicatorSet::LED_1 } else { IndicatorSet::empty() });
            match self.forced_layer {
                Some(layer) => state.on(layer),
                None => state,
            }
        }
    }

    use Action::*;

    type A = Action<TestKey>;

    const K_A: A = Key(KeyCode::A);
    const K_B: A = Key(KeyCode::B);
    const K_C: A = Key(KeyCode::C);

    static KEYMAP: Keymap<TestKey, 3, 2, 4> = Keymap::new([
        LayoutLayer::new(
            "base",
            [
                LayerRow::new([K_A, K_B, Layer(LayerAction::LayerTap(1, KeyCode::SpaceBar)), ModTap(Mods::RCTRL, KeyCode::Right)]),
                LayerRow::new([
                    Layer(LayerAction::Momentary(1)),
                    Layer(LayerAction::TapToggle(2)),
                    Layer(LayerAction::Toggle(2)),
                    Custom(TestKey::Hello),
                ]),
            ],
        ),
        LayoutLayer::new(
            "one",
            [
                LayerRow::new([K_C, Modified(Mods::LCTRL.union(Mods::LSHIFT), KeyCode::R), Transparent, Consumer(ConsumerKey::VolumeUp)]),
                LayerRow::new([Transparent, Transparent, Mouse(MouseKey::Right), Custom(TestKey::Shift)]),
            ],
        ),
        LayoutLayer::new(
            "two",
            [
                LayerRow::new([Rgb(RgbAction::Toggle), Firmware(FirmwareAction::AltGuiSwap), Key(KeyCode::LeftAlt), Layer(LayerAction::To(0, ActivateOn::Release))]),
                LayerRow::new([Firmware(FirmwareAction::Bootloader), Transparent, Transparent, Firmware(FirmwareAction::EepromReset)]),
            ],
        ),
    ]);

    type TestKeyboard = Keyboard<'static, TestKey, TestHooks, SimBoard, 3, 2, 4>;

    fn keyboard_with(config: KeyboardConfig) -> TestKeyboard {
        let mut kb = Keyboard::new(&KEYMAP, config, TestHooks::default(), SimBoard::new(), Instant::from_millis(0));
        kb.init();
        kb.board_mut().take_reports();
        kb
    }

    fn keyboard() -> TestKeyboard {
        keyboard_with(KeyboardConfig::new())
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn press(kb: &mut TestKeyboard, row: u8, col: u8, ms: u64) {
        kb.process(KeyEvent::press(row, col, at(ms)));
    }

    fn release(kb: &mut TestKeyboard, row: u8, col: u8, ms: u64) {
        kb.process(KeyEvent::release(row, col, at(ms)));
    }

    fn keys(report: &Report) -> (u8, [u8; 6]) {
        match report {
            Report::Keyboard(r) => (r.modifiers, r.keycodes),
            other => panic!("Not a keyboard report: {:?}", other),
        }
    }

    fn only(key: KeyCode) -> [u8; 6] {
        [key.usage(), 0, 0, 0, 0, 0]
    }

    const NONE: [u8; 6] = [0; 6];

    #[test]
    fn test_plain_key_press_release() {
        let mut kb = keyboard();
        press(&mut kb, 0, 0, 10);
        release(&mut kb, 0, 0, 20);
        let reports = kb.board_mut().take_reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::A)));
        assert_eq!(keys(&reports[1]), (0, NONE));
    }

    #[test]
    fn test_repeated_events_are_ignored() {
        let mut kb = keyboard();
        press(&mut kb, 0, 0, 10);
        press(&mut kb, 0, 0, 11);
        release(&mut kb, 0, 0, 20);
        release(&mut kb, 0, 0, 21);
        assert_eq!(kb.board_mut().take_reports().len(), 2);
    }

    #[test]
    fn test_momentary_layer_and_cached_release() {
        let mut kb = keyboard();
        press(&mut kb, 1, 0, 0);
        assert!(kb.layer_state().is_on(1));
        press(&mut kb, 0, 0, 10);
        release(&mut kb, 1, 0, 20);
        assert!(!kb.layer_state().is_on(1));
        release(&mut kb, 0, 0, 30);

        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::C)));
        assert_eq!(keys(&reports[1]), (0, NONE));
        assert_eq!(kb.hooks().layer_changes, [LayerState::only(1), LayerState::empty()]);
    }

    #[test]
    fn test_layer_tap_tapped() {
        let mut kb = keyboard();
        press(&mut kb, 0, 2, 0);
        assert!(kb.is_pending());
        release(&mut kb, 0, 2, 50);
        assert!(!kb.is_pending());
        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::SpaceBar)));
        assert_eq!(keys(&reports[1]), (0, NONE));
        assert!(kb.layer_state().is_empty());
    }

    #[test]
    fn test_layer_tap_held_by_timeout() {
        let mut kb = keyboard();
        press(&mut kb, 0, 2, 0);
        kb.tick(at(199));
        assert!(kb.is_pending());
        kb.tick(at(200));
        assert!(kb.layer_state().is_on(1));
        press(&mut kb, 0, 0, 250);
        release(&mut kb, 0, 0, 260);
        release(&mut kb, 0, 2, 300);
        assert!(kb.layer_state().is_empty());

        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::C)));
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_events_behind_pending_key_are_replayed_after_tap() {
        let mut kb = keyboard();
        press(&mut kb, 0, 2, 0);
        press(&mut kb, 0, 0, 20);
        assert_eq!(kb.board_mut().take_reports().len(), 0);
        release(&mut kb, 0, 2, 40);
        release(&mut kb, 0, 0, 60);

        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::SpaceBar)));
        assert_eq!(keys(&reports[1]), (0, NONE));
        assert_eq!(keys(&reports[2]), (0, only(KeyCode::A)));
        assert_eq!(keys(&reports[3]), (0, NONE));
    }

    #[test]
    fn test_late_event_resolves_hold() {
        let mut kb = keyboard();
        press(&mut kb, 0, 2, 0);
        press(&mut kb, 0, 0, 300);
        assert!(kb.layer_state().is_on(1));
        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (0, only(KeyCode::C)));
    }

    #[test]
    fn test_hold_on_other_key_press() {
        let config = KeyboardConfig {
            tap_hold: TapHoldConfig { hold_on_other_key_press: true, ..TapHoldConfig::new() },
            ..KeyboardConfig::new()
        };
        let mut kb = keyboard_with(config);
        press(&mut kb, 0, 3, 0);
        press(&mut kb, 0, 0, 10);
        assert_eq!(kb.mods(), Mods::RCTRL);
        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (Mods::RCTRL.bits(), NONE));
        assert_eq!(keys(&reports[1]), (Mods::RCTRL.bits(), only(KeyCode::A)));
    }

    #[test]
    fn test_permissive_hold() {
        let config = KeyboardConfig {
            tap_hold: TapHoldConfig { permissive_hold: true, ..TapHoldConfig::new() },
            ..KeyboardConfig::new()
        };
        let mut kb = keyboard_with(config);
        press(&mut kb, 0, 3, 0);
        press(&mut kb, 0, 0, 10);
        assert!(kb.is_pending());
        release(&mut kb, 0, 0, 20);
        assert!(!kb.is_pending());
        release(&mut kb, 0, 3, 30);

        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (Mods::RCTRL.bits(), NONE));
        assert_eq!(keys(&reports[1]), (Mods::RCTRL.bits(), only(KeyCode::A)));
        assert_eq!(keys(&reports[2]), (Mods::RCTRL.bits(), NONE));
        assert_eq!(keys(&reports[3]), (0, NONE));
    }

    #[test]
    fn test_buffer_overflow_resolves_hold() {
        let mut kb = keyboard();
        press(&mut kb, 0, 2, 0);
        for i in 0..PENDING_EVENTS as u64 / 2 {
            press(&mut kb, 0, 0, 1 + 2 * i);
            release(&mut kb, 0, 0, 2 + 2 * i);
        }
        assert!(kb.is_pending());
        press(&mut kb, 0, 1, 100);
        assert!(!kb.is_pending());
        assert!(kb.layer_state().is_on(1));
    }

    #[test]
    fn test_tap_toggle_locks_after_taps() {
        let mut kb = keyboard();
        for i in 0..4 {
            press(&mut kb, 1, 1, i * 100);
            assert!(kb.layer_state().is_on(2));
            release(&mut kb, 1, 1, i * 100 + 20);
            assert!(!kb.layer_state().is_on(2));
        }
        press(&mut kb, 1, 1, 400);
        release(&mut kb, 1, 1, 420);
        assert!(kb.layer_state().is_on(2));
    }

    #[test]
    fn test_tap_toggle_held_is_momentary() {
        let config = KeyboardConfig {
            tap_hold: TapHoldConfig { tapping_toggle: 1, ..TapHoldConfig::new() },
            ..KeyboardConfig::new()
        };
        let mut kb = keyboard_with(config);
        press(&mut kb, 1, 1, 0);
        release(&mut kb, 1, 1, 500);
        assert!(kb.layer_state().is_empty());

        press(&mut kb, 1, 1, 1000);
        release(&mut kb, 1, 1, 1010);
        assert!(kb.layer_state().is_on(2));
        press(&mut kb, 1, 1, 2000);
        release(&mut kb, 1, 1, 2010);
        assert!(kb.layer_state().is_empty());
    }

    #[test]
    fn test_toggle_on_release_and_to_on_release() {
        let mut kb = keyboard();
        press(&mut kb, 1, 2, 0);
        assert!(kb.layer_state().is_empty());
        release(&mut kb, 1, 2, 10);
        assert!(kb.layer_state().is_on(2));

        press(&mut kb, 0, 3, 20);
        assert!(kb.layer_state().is_on(2));
        release(&mut kb, 0, 3, 30);
        assert_eq!(kb.layer_state(), LayerState::only(0));
    }

    #[test]
    fn test_modified_key() {
        let mut kb = keyboard();
        press(&mut kb, 1, 0, 0);
        press(&mut kb, 0, 1, 10);
        release(&mut kb, 0, 1, 20);
        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), ((Mods::LCTRL | Mods::LSHIFT).bits(), only(KeyCode::R)));
        assert_eq!(keys(&reports[1]), (0, NONE));
    }

    #[test]
    fn test_consumer_and_mouse_reports() {
        let mut kb = keyboard();
        press(&mut kb, 1, 0, 0);
        press(&mut kb, 0, 3, 10);
        release(&mut kb, 0, 3, 20);
        press(&mut kb, 1, 2, 30);
        kb.tick(at(330));
        release(&mut kb, 1, 2, 340);

        let reports = kb.board_mut().take_reports();
        assert_eq!(reports[0], Report::Consumer(ConsumerReport::new(ConsumerKey::VolumeUp.usage())));
        assert_eq!(reports[1], Report::Consumer(ConsumerReport::released()));
        let delta = kb.config().mouse.move_delta;
        assert_eq!(reports[2], Report::Mouse(MouseReport { x: delta, ..Default::default() }));
        assert_eq!(reports[3], Report::Mouse(MouseReport { x: delta, ..Default::default() }));
        assert_eq!(reports[4], Report::Mouse(MouseReport::default()));
    }

    #[test]
    fn test_custom_keys() {
        let mut kb = keyboard();
        press(&mut kb, 1, 3, 0);
        let reports = kb.board_mut().take_reports();
        assert_eq!(keys(&reports[0]), (Mods::LSHIFT.bits(), only(KeyCode::H)));
        assert_eq!(keys(&reports[1]), (0, NONE));
        assert_eq!(keys(&reports[2]), (0, only(KeyCode::I)));
        assert_eq!(keys(&reports[3]), (0, NONE));
        assert_eq!(keys(&reports[4]), (Mods::LSHIFT.bits(), only(KeyCode::One)));
        assert_eq!(keys(&reports[5]), (0, NONE));
        release(&mut kb, 1, 3, 10);

        press(&mut kb, 1, 0, 20);
        press(&mut kb, 1, 3, 30);
        assert_eq!(kb.mods(), Mods::RSHIFT);
        release(&mut kb, 1, 0, 40);
        release(&mut kb, 1, 3, 50);
        assert_eq!(kb.mods(), Mods::empty());
    }

    #[test]
    fn test_layer_hook_result_replaces_state() {
        let mut kb = keyboard();
        kb.hooks.forced_layer = Some(2);
        press(&mut kb, 1, 0, 0);
        assert_eq!(kb.layer_state(), LayerState::only(1).on(2));
        assert_eq!(kb.board().indicators, IndicatorSet::LED_1);
    }

    #[test]
    fn test_firmware_and_rgb_keys() {
        let mut kb = keyboard();
        press(&mut kb, 1, 2, 0);
        release(&mut kb, 1, 2, 10);

        press(&mut kb, 0, 0, 20);
        release(&mut kb, 0, 0, 30);
        assert!(!kb.rgb().is_enabled());
        assert!(!kb.eeconfig().rgb.enabled);

        press(&mut kb, 0, 1, 40);
        release(&mut kb, 0, 1, 50);
        assert!(kb.eeconfig().keymap.swap_alt_gui);
        kb.board_mut().take_reports();
        press(&mut kb, 0, 2, 60);
        assert_eq!(keys(&kb.board_mut().take_reports()[0]), (Mods::LGUI.bits(), NONE));
        release(&mut kb, 0, 2, 70);

        press(&mut kb, 1, 0, 80);
        assert_eq!(kb.board().bootloader_requests, 1);
        release(&mut kb, 1, 0, 90);

        press(&mut kb, 1, 3, 100);
        assert_eq!(*kb.eeconfig(), EeConfig::new());
        assert!(!kb.rgb().is_enabled());
        assert_eq!(read_config(kb.board_mut().eeprom()).unwrap(), EeConfig::new());
    }

    #[test]
    fn test_persistent_default_layer() {
        let mut kb = keyboard();
        kb.ops().set_single_persistent_default_layer(2);
        assert_eq!(kb.default_layer_state(), LayerState::only(2));

        let board = kb.board().clone();
        let mut kb = Keyboard::new(&KEYMAP, KeyboardConfig::new(), TestHooks::default(), board, at(0));
        kb.init();
        assert_eq!(kb.default_layer_state(), LayerState::only(2));
        assert_eq!(kb.current_layer(), 2);
    }

    #[test]
    fn test_busy_host_keeps_reports() {
        let mut kb = keyboard();
        kb.board_mut().busy = true;
        press(&mut kb, 0, 0, 0);
        release(&mut kb, 0, 0, 10);
        assert_eq!(kb.queued_reports(), 2);
        kb.board_mut().busy = false;
        kb.tick(at(20));
        assert_eq!(kb.queued_reports(), 0);
        assert_eq!(kb.board_mut().take_reports().len(), 2);
    }

    #[test]
    fn test_tapping_term_is_configurable() {
        let config = KeyboardConfig {
            tap_hold: TapHoldConfig { tapping_term: Duration::from_millis(50), ..TapHoldConfig::new() },
            ..KeyboardConfig::new()
        };
        let mut kb = keyboard_with(config);
        press(&mut kb, 0, 2, 0);
        release(&mut kb, 0, 2, 60);
        assert!(kb.board_mut().take_reports().is_empty());
    }
}
