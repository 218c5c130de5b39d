//! The wave scene
//!
//! Tracks one match from the first wave banner to the extra wave:
//!
//! - `AwaitingStart`: the banner is read every cycle until it shows "1".
//!   After `initial_wave_max_retry` misses, wave 1 is assumed.
//! - `Active(n)`: the banner, wave number and quota are only re-read once
//!   the predicted countdown window has elapsed. A banner that no longer
//!   matches hands over to the extra-wave check.
//! - `Extra`: the extra-wave banner is re-verified on the same gate; a
//!   mismatch answers `False` so a sibling detector can take over.
//!
//! Countdown, player status and the unstable flag are read on every cycle
//! regardless of phase.

use super::config::{WaveConfig, WaveLayout};
use super::recognition::{ColorModel, DigitReader, TeamColor};
use super::state::{WavePhase, WaveState};
use crate::event::{GameUpdate, PlayerStatus, SceneEvent, Wave};
use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use image::GrayImage;
use shakescout_cv::{Frame, ImageUtils, Template, TemplateLoader};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reference images the wave scene compares against
#[derive(Debug, Clone)]
pub struct WaveTemplates {
    /// "WAVE" text without the number
    pub wave: Template,
    /// Full extra-wave banner
    pub wave_ex: Template,
    pub unstable: Template,
}

impl WaveTemplates {
    pub fn load(loader: &TemplateLoader) -> anyhow::Result<Self> {
        Ok(Self {
            wave: loader.require("wave")?,
            wave_ex: loader.require("wave_ex")?,
            unstable: loader.require("unstable")?,
        })
    }
}

/// Readings taken on every cycle
struct CycleReads {
    count: Option<u32>,
    players: [PlayerStatus; 4],
    unstable: bool,
}

pub struct WaveScene {
    reader: Arc<dyn DigitReader>,
    colors: Arc<dyn ColorModel>,
    templates: WaveTemplates,
    layout: WaveLayout,
    config: WaveConfig,
}

impl WaveScene {
    pub fn new(
        reader: Arc<dyn DigitReader>,
        colors: Arc<dyn ColorModel>,
        templates: WaveTemplates,
    ) -> Self {
        Self {
            reader,
            colors,
            templates,
            layout: WaveLayout::default(),
            config: WaveConfig::default(),
        }
    }

    pub fn with_layout(mut self, layout: WaveLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_config(mut self, config: WaveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    fn wave_cycle(
        &self,
        context: &SceneContext<'_>,
        state: &mut WaveState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let timestamp = context.timestamp();
        let mut forced = false;

        let gate_open = state.phase == WavePhase::AwaitingStart || timestamp >= state.end;
        if gate_open {
            debug!(timestamp, end = state.end, phase = ?state.phase, "wave gate open");
            dev_log(context, || format!("wave gate open: ts={} end={}", timestamp, state.end))?;

            let wave_image = frame.apply(&self.layout.wave)?;
            let (text, number) = ImageUtils::split_columns(&wave_image, self.templates.wave.width());
            let wave_error = ImageUtils::mean_absolute_error(&text, &self.templates.wave.image)?;
            debug!(wave_error, "wave template compared");
            dev_log(context, || format!("wave_error={:.4}", wave_error))?;

            if wave_error > self.config.max_error {
                state.quota = None;
                return self.extra_cycle(context, state, frame, Some(wave_image));
            }

            if state.color.is_none() {
                let players = frame.subimage(&self.layout.players)?;
                state.color = self.colors.nearest_color(players.native());
                debug!(color = ?state.color, "team color assigned");
            }

            let reading = self.reader.read(&number);
            state.last_ocr = reading;
            forced = self.advance_wave(context, state, reading)?;

            // A missed read never erases the last known quota
            if let Some(quota) = self.reader.read(&frame.apply(&self.layout.quota)?) {
                state.quota = Some(quota);
            }
        }

        let amount = self.reader.read(&frame.apply(&self.layout.amount)?);
        let reads = self.cycle_reads(context, state, frame)?;

        let retrying =
            state.phase == WavePhase::AwaitingStart && state.retry_count > 0 && !forced;
        if (reads.count.is_some() || amount.is_some() || forced) && !retrying {
            context.send(SceneEvent::GameUpdate(GameUpdate {
                color: color_name(state.color.as_ref()),
                wave: state.phase.wave(),
                count: reads.count,
                amount,
                quota: state.quota,
                players: reads.players,
                unstable: reads.unstable,
                forced,
            }))?;
        }

        Ok(SceneStatus::Continue)
    }

    /// Apply a wave-number reading. Returns whether wave 1 was forced.
    fn advance_wave(
        &self,
        context: &SceneContext<'_>,
        state: &mut WaveState,
        reading: Option<u32>,
    ) -> Result<bool> {
        match state.phase {
            WavePhase::AwaitingStart => {
                if reading == Some(1) {
                    state.phase = WavePhase::Active(1);
                    state.retry_count = 0;
                    info!(timestamp = context.timestamp(), "first wave confirmed");
                    return Ok(false);
                }

                let max_retry = self.config.initial_wave_max_retry;
                if state.retry_count < max_retry {
                    state.retry_count += 1;
                }
                if state.retry_count < max_retry {
                    return Ok(false);
                }

                state.phase = WavePhase::Active(1);
                info!(
                    retry_count = state.retry_count,
                    last_ocr = ?reading,
                    timestamp = context.timestamp(),
                    "initial wave forced to 1"
                );
                dev_log(context, || {
                    format!(
                        "initial wave forced to 1: retry_count={} last_ocr={:?} ts={}",
                        state.retry_count,
                        reading,
                        context.timestamp()
                    )
                })?;
                Ok(true)
            }
            WavePhase::Active(_) => {
                if let Some(number) = reading {
                    state.phase = WavePhase::Active(number);
                }
                Ok(false)
            }
            WavePhase::Extra => Ok(false),
        }
    }

    /// Extra-wave handling. `wave_image` is the banner already extracted
    /// by a failed wave check, which forces the verification this cycle.
    fn extra_cycle(
        &self,
        context: &SceneContext<'_>,
        state: &mut WaveState,
        frame: &Frame,
        wave_image: Option<GrayImage>,
    ) -> Result<SceneStatus> {
        if wave_image.is_some() || context.timestamp() >= state.end {
            let wave_image = match wave_image {
                Some(image) => image,
                None => frame.apply(&self.layout.wave)?,
            };
            let error = ImageUtils::mean_absolute_error(&wave_image, &self.templates.wave_ex.image)?;
            let matched = error <= self.config.max_error;
            debug!(error, matched, "extra wave template compared");
            dev_log(context, || format!("extra_check mae={:.4} below_threshold={}", error, matched))?;

            if !matched {
                return Ok(SceneStatus::False);
            }

            if state.phase != WavePhase::Extra {
                info!(timestamp = context.timestamp(), "extra wave detected");
            }
            state.phase = WavePhase::Extra;
            state.quota = None;
        }

        let reads = self.cycle_reads(context, state, frame)?;
        context.send(SceneEvent::GameUpdate(GameUpdate {
            color: color_name(state.color.as_ref()),
            wave: Wave::Extra,
            count: reads.count,
            amount: None,
            quota: None,
            players: reads.players,
            unstable: reads.unstable,
            forced: false,
        }))?;

        Ok(SceneStatus::Continue)
    }

    fn cycle_reads(
        &self,
        context: &SceneContext<'_>,
        state: &mut WaveState,
        frame: &Frame,
    ) -> Result<CycleReads> {
        let count = self.reader.read(&frame.apply(&self.layout.timer)?);
        let players = self.player_status(state.color.as_ref(), frame)?;
        let unstable = self.unstable(frame)?;

        self.track_count(context, state, count)?;

        Ok(CycleReads {
            count,
            players,
            unstable,
        })
    }

    /// Feed the countdown through the anomaly detector; trusted values move
    /// the predicted end of the window.
    fn track_count(
        &self,
        context: &SceneContext<'_>,
        state: &mut WaveState,
        count: Option<u32>,
    ) -> Result<()> {
        let Some(count) = count else {
            return Ok(());
        };

        let timestamp = context.timestamp();
        if !state.detector.is_anomalous(count, timestamp) {
            state.end = timestamp + (self.config.countdown_start as f64 - count as f64);
            return Ok(());
        }

        let previous = state.detector.previous();
        warn!(count, ?previous, timestamp, "anomalous countdown reading");
        dev_log(context, || {
            let elapsed = previous.map(|(_, at)| timestamp - at);
            format!(
                "timer anomaly: count={} previous={:?} elapsed={:?}",
                count, previous, elapsed
            )
        })?;

        context.send_immediately(SceneEvent::dev_warn(format!(
            "Anomalous value detected: {}",
            count
        )))
    }

    fn player_status(&self, color: Option<&TeamColor>, frame: &Frame) -> Result<[PlayerStatus; 4]> {
        let region = frame.subimage(&self.layout.players)?;
        let gegg = self.colors.gegg_mask(region.native());

        // Icons can only be told apart from the background once the team
        // colour is known
        let alive = color.map(|color| self.colors.alive_mask(region.native(), color));

        Ok(std::array::from_fn(|index| PlayerStatus {
            alive: alive
                .as_ref()
                .is_some_and(|mask| self.column_lit(mask, index, self.config.alive_threshold)),
            gegg: self.column_lit(&gegg, index, self.config.gegg_threshold),
        }))
    }

    fn column_lit(&self, mask: &GrayImage, index: usize, threshold: u32) -> bool {
        let left = index as u32 * self.config.player_stride;
        let column = ImageUtils::crop_columns(mask, left, self.config.player_width);
        ImageUtils::count_nonzero(&column) >= threshold
    }

    fn unstable(&self, frame: &Frame) -> Result<bool> {
        let image = frame.apply(&self.layout.unstable)?;
        let error = ImageUtils::mean_absolute_error(&image, &self.templates.unstable.image)?;
        Ok(error <= self.config.max_error)
    }
}

impl Scene for WaveScene {
    fn name(&self) -> &str {
        "wave"
    }

    fn setup(&self) -> SceneState {
        SceneState::Wave(Box::new(WaveState::new(self.config.anomaly.clone())))
    }

    fn reset(&self, state: &mut SceneState) {
        match state {
            SceneState::Wave(state) => state.clear(),
            _ => *state = self.setup(),
        }
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let SceneState::Wave(state) = state else {
            return Err(Error::state_mismatch(self.name()));
        };

        if state.phase == WavePhase::Extra {
            return self.extra_cycle(context, state, frame, None);
        }

        self.wave_cycle(context, state, frame)
    }
}

fn color_name(color: Option<&TeamColor>) -> Option<String> {
    color.map(|color| color.name.clone())
}

/// Development diagnostics; the message is only built in dev mode
fn dev_log(context: &SceneContext<'_>, message: impl FnOnce() -> String) -> Result<()> {
    if context.dev_mode() {
        context.send(SceneEvent::dev_log(message()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::Root;
    use crate::event::{Delivery, EventQueue};
    use image::{Luma, Rgb, RgbImage};
    use shakescout_cv::{Part, RectF};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Grey levels painted into each HUD part; the fake reader keys on them
    const WAVE_TEXT: u8 = 200;
    const WAVE_NUMBER: u8 = 10;
    const QUOTA: u8 = 20;
    const AMOUNT: u8 = 30;
    const TIMER: u8 = 40;
    const UNSTABLE: u8 = 50;
    const EXTRA_BANNER: u8 = 90;

    #[derive(Clone, Copy)]
    enum Banner {
        Wave,
        Extra,
        Blank,
    }

    /// Answers a fixed value per part and counts reads
    #[derive(Default)]
    struct FakeReader {
        values: Mutex<HashMap<u8, Option<u32>>>,
        calls: Mutex<HashMap<u8, usize>>,
    }

    impl FakeReader {
        fn set(&self, part: u8, value: Option<u32>) {
            self.values.lock().unwrap().insert(part, value);
        }

        fn calls(&self, part: u8) -> usize {
            self.calls.lock().unwrap().get(&part).copied().unwrap_or(0)
        }
    }

    impl DigitReader for FakeReader {
        fn read(&self, image: &GrayImage) -> Option<u32> {
            let part = image.get_pixel_checked(0, 0).map(|pixel| pixel[0])?;
            *self.calls.lock().unwrap().entry(part).or_default() += 1;
            self.values.lock().unwrap().get(&part).copied().flatten()
        }
    }

    struct FakeColors {
        alive: [bool; 4],
        gegg: [bool; 4],
    }

    impl FakeColors {
        fn mask(lit: [bool; 4]) -> GrayImage {
            GrayImage::from_fn(128, 64, |x, _| {
                let index = (x / 32) as usize;
                if x % 32 < 30 && lit[index] { Luma([255]) } else { Luma([0]) }
            })
        }
    }

    impl ColorModel for FakeColors {
        fn nearest_color(&self, _players: &RgbImage) -> Option<TeamColor> {
            Some(TeamColor::new("yellow", 30))
        }

        fn alive_mask(&self, _players: &RgbImage, _color: &TeamColor) -> GrayImage {
            Self::mask(self.alive)
        }

        fn gegg_mask(&self, _players: &RgbImage) -> GrayImage {
            Self::mask(self.gegg)
        }
    }

    /// 128x128 frame: the HUD strip on top, players in the bottom half
    fn layout() -> WaveLayout {
        WaveLayout {
            wave: Part::new(RectF::new(0.0, 0.0, 0.5, 0.125)),
            quota: Part::new(RectF::new(0.5, 0.0, 0.625, 0.125)),
            amount: Part::new(RectF::new(0.625, 0.0, 0.75, 0.125)),
            timer: Part::new(RectF::new(0.75, 0.0, 0.875, 0.125)),
            unstable: Part::new(RectF::new(0.875, 0.0, 1.0, 0.125)),
            players: RectF::new(0.0, 0.5, 1.0, 1.0),
        }
    }

    fn frame(banner: Banner) -> Frame {
        Frame::new(RgbImage::from_fn(128, 128, |x, y| {
            let level = if y >= 16 {
                0
            } else {
                match x {
                    0..32 => match banner {
                        Banner::Wave => WAVE_TEXT,
                        Banner::Extra => EXTRA_BANNER,
                        Banner::Blank => 0,
                    },
                    32..64 => match banner {
                        Banner::Wave => WAVE_NUMBER,
                        Banner::Extra => EXTRA_BANNER,
                        Banner::Blank => 0,
                    },
                    64..80 => QUOTA,
                    80..96 => AMOUNT,
                    96..112 => TIMER,
                    _ => UNSTABLE,
                }
            };
            Rgb([level, level, level])
        }))
    }

    fn templates() -> WaveTemplates {
        WaveTemplates {
            wave: Template::new("wave", GrayImage::from_pixel(32, 16, Luma([WAVE_TEXT]))),
            wave_ex: Template::new("wave_ex", GrayImage::from_pixel(64, 16, Luma([EXTRA_BANNER]))),
            unstable: Template::new("unstable", GrayImage::from_pixel(16, 16, Luma([UNSTABLE]))),
        }
    }

    struct Fixture {
        reader: Arc<FakeReader>,
        scene: WaveScene,
        sink: EventQueue,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_colors(FakeColors {
                alive: [true; 4],
                gegg: [false; 4],
            })
        }

        fn with_colors(colors: FakeColors) -> Self {
            let reader = Arc::new(FakeReader::default());
            let scene = WaveScene::new(reader.clone(), Arc::new(colors), templates())
                .with_layout(layout())
                .with_config(WaveConfig {
                    player_stride: 32,
                    player_width: 30,
                    ..WaveConfig::default()
                });

            Self {
                reader,
                scene,
                sink: EventQueue::new(),
            }
        }

        fn step(&self, state: &mut SceneState, timestamp: f64, banner: Banner) -> Result<SceneStatus> {
            let context = SceneContext::new(timestamp, &self.sink);
            self.scene.analysis(&context, state, &frame(banner))
        }

        fn updates(&self) -> Vec<GameUpdate> {
            self.sink
                .drain_events()
                .into_iter()
                .filter_map(|event| match event {
                    SceneEvent::GameUpdate(update) => Some(update),
                    _ => None,
                })
                .collect()
        }
    }

    fn wave_state(state: &mut SceneState) -> &mut WaveState {
        match state {
            SceneState::Wave(state) => &mut **state,
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_first_wave_confirmed_on_one() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(AMOUNT, Some(4));
        let mut state = fixture.scene.setup();

        assert_eq!(fixture.step(&mut state, 0.0, Banner::Wave)?, SceneStatus::Continue);

        let wave = wave_state(&mut state);
        assert_eq!(wave.phase(), WavePhase::Active(1));
        assert_eq!(wave.retry_count(), 0);
        assert_eq!(wave.color(), Some(&TeamColor::new("yellow", 30)));

        let updates = fixture.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].wave, Wave::Number(1));
        assert_eq!(updates[0].amount, Some(4));
        assert_eq!(updates[0].color.as_deref(), Some("yellow"));
        assert!(!updates[0].forced);
        Ok(())
    }

    #[test]
    fn test_first_wave_forced_after_retries() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(3));
        fixture.reader.set(AMOUNT, Some(4));
        let mut state = fixture.scene.setup();
        let max_retry = fixture.scene.config().initial_wave_max_retry;

        for cycle in 1..max_retry {
            fixture.step(&mut state, cycle as f64, Banner::Wave)?;
            let wave = wave_state(&mut state);
            assert_eq!(wave.phase(), WavePhase::AwaitingStart);
            assert_eq!(wave.retry_count(), cycle);
            assert_eq!(wave.last_ocr(), Some(3));
        }
        // Empty-handed retries are not reported
        assert!(fixture.updates().is_empty());

        fixture.step(&mut state, max_retry as f64, Banner::Wave)?;
        assert_eq!(wave_state(&mut state).phase(), WavePhase::Active(1));
        assert_eq!(fixture.reader.calls(WAVE_NUMBER), max_retry as usize);

        let updates = fixture.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].forced);
        assert_eq!(updates[0].wave, Wave::Number(1));
        Ok(())
    }

    #[test]
    fn test_forced_cycle_is_reported_without_readings() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, None);
        let mut state = fixture.scene.setup();
        let max_retry = fixture.scene.config().initial_wave_max_retry;

        for cycle in 0..max_retry {
            fixture.step(&mut state, cycle as f64, Banner::Wave)?;
        }

        let updates = fixture.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].forced);
        assert_eq!(updates[0].count, None);
        assert_eq!(updates[0].amount, None);
        Ok(())
    }

    #[test]
    fn test_expensive_reads_wait_for_the_gate() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(7));
        fixture.reader.set(QUOTA, Some(30));
        fixture.reader.set(AMOUNT, Some(12));
        let mut state = fixture.scene.setup();
        {
            let wave = wave_state(&mut state);
            wave.phase = WavePhase::Active(2);
            wave.quota = Some(18);
            wave.end = 100.0;
        }

        for timestamp in [10.0, 50.0, 99.9] {
            fixture.step(&mut state, timestamp, Banner::Wave)?;
        }
        assert_eq!(fixture.reader.calls(WAVE_NUMBER), 0);
        assert_eq!(fixture.reader.calls(QUOTA), 0);
        assert_eq!(fixture.reader.calls(AMOUNT), 3);
        assert_eq!(wave_state(&mut state).phase(), WavePhase::Active(2));
        assert_eq!(wave_state(&mut state).quota(), Some(18));

        fixture.step(&mut state, 100.0, Banner::Wave)?;
        assert_eq!(fixture.reader.calls(WAVE_NUMBER), 1);
        assert_eq!(fixture.reader.calls(QUOTA), 1);
        assert_eq!(wave_state(&mut state).phase(), WavePhase::Active(7));
        assert_eq!(wave_state(&mut state).quota(), Some(30));

        let updates = fixture.updates();
        assert_eq!(updates.len(), 4);
        assert_eq!(updates[2].wave, Wave::Number(2));
        assert_eq!(updates[3].wave, Wave::Number(7));
        Ok(())
    }

    #[test]
    fn test_missing_reads_keep_last_values() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(QUOTA, Some(22));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;

        fixture.reader.set(WAVE_NUMBER, None);
        fixture.reader.set(QUOTA, None);
        fixture.step(&mut state, 1.0, Banner::Wave)?;

        let wave = wave_state(&mut state);
        assert_eq!(wave.phase(), WavePhase::Active(1));
        assert_eq!(wave.quota(), Some(22));
        Ok(())
    }

    #[test]
    fn test_countdown_moves_the_gate() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(TIMER, Some(80));
        let mut state = fixture.scene.setup();

        fixture.step(&mut state, 5.0, Banner::Wave)?;
        assert_eq!(wave_state(&mut state).end(), 25.0);

        fixture.reader.set(TIMER, Some(79));
        fixture.step(&mut state, 6.0, Banner::Wave)?;
        assert_eq!(wave_state(&mut state).end(), 27.0);
        assert_eq!(fixture.reader.calls(WAVE_NUMBER), 1);
        Ok(())
    }

    #[test]
    fn test_anomalous_count_is_reported_immediately() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(TIMER, Some(80));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;
        fixture.sink.drain();

        // "79" misread as "10"
        fixture.reader.set(TIMER, Some(10));
        fixture.step(&mut state, 1.0, Banner::Wave)?;
        assert_eq!(wave_state(&mut state).end(), 20.0);

        let delivered = fixture.sink.drain();
        assert_eq!(
            delivered[0],
            (
                Delivery::Immediate,
                SceneEvent::dev_warn("Anomalous value detected: 10")
            )
        );
        // The update itself still goes out with the raw reading
        assert!(matches!(
            &delivered[1],
            (Delivery::Batched, SceneEvent::GameUpdate(update)) if update.count == Some(10)
        ));
        Ok(())
    }

    #[test]
    fn test_extra_wave_lifecycle() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(QUOTA, Some(25));
        fixture.reader.set(TIMER, Some(95));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;
        assert_eq!(wave_state(&mut state).end(), 5.0);

        // Banner changes once the window has elapsed
        fixture.reader.set(TIMER, Some(90));
        assert_eq!(fixture.step(&mut state, 5.0, Banner::Extra)?, SceneStatus::Continue);
        let wave = wave_state(&mut state);
        assert_eq!(wave.phase(), WavePhase::Extra);
        assert_eq!(wave.quota(), None);
        assert_eq!(wave.end(), 15.0);

        // Inside the window nothing is re-verified, even with the banner gone
        fixture.reader.set(TIMER, Some(89));
        assert_eq!(fixture.step(&mut state, 6.0, Banner::Blank)?, SceneStatus::Continue);
        assert_eq!(wave_state(&mut state).end(), 17.0);

        let updates = fixture.updates();
        assert_eq!(updates.len(), 3);
        assert!(updates[1..].iter().all(|update| update.wave == Wave::Extra
            && update.quota.is_none()
            && update.amount.is_none()));

        // Window over and the banner is gone: the hypothesis ends
        assert_eq!(fixture.step(&mut state, 17.0, Banner::Blank)?, SceneStatus::False);
        assert!(fixture.updates().is_empty());
        Ok(())
    }

    #[test]
    fn test_extra_wave_reverified_while_banner_holds() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(TIMER, Some(95));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;
        fixture.reader.set(TIMER, Some(90));
        fixture.step(&mut state, 5.0, Banner::Extra)?;
        assert_eq!(wave_state(&mut state).end(), 15.0);
        fixture.sink.drain();

        // Window elapsed and the extra banner is still up
        fixture.reader.set(TIMER, Some(80));
        let context = SceneContext::new(15.0, &fixture.sink).with_dev_mode(true);
        let status = fixture.scene.analysis(&context, &mut state, &frame(Banner::Extra))?;
        assert_eq!(status, SceneStatus::Continue);
        assert_eq!(wave_state(&mut state).phase(), WavePhase::Extra);

        let events = fixture.sink.drain_events();
        let checks = events
            .iter()
            .filter(|event| matches!(event, SceneEvent::DevLog { message } if message.starts_with("extra_check")))
            .count();
        assert_eq!(checks, 1);

        let updates: Vec<_> = events
            .into_iter()
            .filter_map(|event| match event {
                SceneEvent::GameUpdate(update) => Some(update),
                _ => None,
            })
            .collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].wave, Wave::Extra);
        assert_eq!(updates[0].count, Some(80));
        assert_eq!(wave_state(&mut state).end(), 35.0);
        Ok(())
    }

    #[test]
    fn test_lost_banner_answers_false() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(QUOTA, Some(25));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;

        assert_eq!(fixture.step(&mut state, 1.0, Banner::Blank)?, SceneStatus::False);
        let wave = wave_state(&mut state);
        assert_eq!(wave.phase(), WavePhase::Active(1));
        assert_eq!(wave.quota(), None);
        Ok(())
    }

    #[test]
    fn test_player_status_columns() -> Result<()> {
        let fixture = Fixture::with_colors(FakeColors {
            alive: [true, false, true, false],
            gegg: [false, true, false, false],
        });
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(AMOUNT, Some(3));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;

        let players = fixture.updates()[0].players;
        assert_eq!(
            players,
            [
                PlayerStatus { alive: true, gegg: false },
                PlayerStatus { alive: false, gegg: true },
                PlayerStatus { alive: true, gegg: false },
                PlayerStatus { alive: false, gegg: false },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unstable_flag() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(AMOUNT, Some(3));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;
        assert!(fixture.updates()[0].unstable);
        Ok(())
    }

    #[test]
    fn test_dev_mode_adds_diagnostics_only() -> Result<()> {
        let run = |dev_mode: bool| -> Result<Vec<SceneEvent>> {
            let fixture = Fixture::new();
            fixture.reader.set(WAVE_NUMBER, Some(1));
            fixture.reader.set(AMOUNT, Some(3));
            let root = Root::new(fixture.scene, dev_mode);
            let mut state = root.setup();
            let context = SceneContext::new(0.0, &fixture.sink);
            root.analysis(&context, &mut state, &frame(Banner::Wave))?;
            Ok(fixture.sink.drain_events())
        };

        let plain = run(false)?;
        let dev = run(true)?;

        let is_log = |event: &SceneEvent| matches!(event, SceneEvent::DevLog { .. });
        assert!(!plain.iter().any(is_log));
        assert!(dev.iter().any(is_log));

        let without_logs: Vec<_> = dev.into_iter().filter(|event| !is_log(event)).collect();
        assert_eq!(without_logs, plain);
        Ok(())
    }

    #[test]
    fn test_reset_clears_state() -> Result<()> {
        let fixture = Fixture::new();
        fixture.reader.set(WAVE_NUMBER, Some(1));
        fixture.reader.set(TIMER, Some(60));
        let mut state = fixture.scene.setup();
        fixture.step(&mut state, 0.0, Banner::Wave)?;

        fixture.scene.reset(&mut state);
        let wave = wave_state(&mut state);
        assert_eq!(wave.phase(), WavePhase::AwaitingStart);
        assert_eq!(wave.end(), f64::NEG_INFINITY);
        assert_eq!(wave.color(), None);
        assert_eq!(wave.detector().previous(), None);
        Ok(())
    }

    #[test]
    fn test_template_shape_mismatch_aborts_cycle() {
        let reader = Arc::new(FakeReader::default());
        let mut bad = templates();
        bad.wave_ex = Template::new("wave_ex", GrayImage::new(10, 10));
        let scene = WaveScene::new(
            reader,
            Arc::new(FakeColors {
                alive: [true; 4],
                gegg: [false; 4],
            }),
            bad,
        )
        .with_layout(layout());

        let sink = EventQueue::new();
        let mut state = scene.setup();
        let context = SceneContext::new(0.0, &sink);
        let err = scene.analysis(&context, &mut state, &frame(Banner::Blank)).unwrap_err();
        assert!(matches!(
            err,
            Error::Vision(shakescout_cv::Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_templates_load_from_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["wave", "wave_ex"] {
            GrayImage::from_pixel(8, 4, Luma([WAVE_TEXT])).save(dir.path().join(format!("{}.png", name)))?;
        }
        let loader = TemplateLoader::new().add_template_dir(dir.path());

        let err = WaveTemplates::load(&loader).unwrap_err();
        assert!(err.to_string().contains("'unstable' not found"));

        GrayImage::new(4, 4).save(dir.path().join("UNSTABLE.png"))?;
        let templates = WaveTemplates::load(&loader)?;
        assert_eq!(templates.wave.width(), 8);
        assert_eq!(templates.unstable.name, "unstable");
        Ok(())
    }

    #[test]
    fn test_foreign_state_is_rejected() {
        let fixture = Fixture::new();
        let mut state = SceneState::Empty;
        let err = fixture.step(&mut state, 0.0, Banner::Wave).unwrap_err();
        assert!(matches!(err, Error::StateMismatch { .. }));
    }
}
