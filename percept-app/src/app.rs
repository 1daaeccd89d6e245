use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use percept_core::CompletionRecord;
use percept_render::{Compositor, StimulusRenderer, Surface};
use percept_timing::{HighPrecisionTimer, Timer};
use percept_trial::{SessionConfig, SessionEvent, TrialParams, TrialSession, normalize};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

/// Fullscreen host for a single trial.
///
/// The stimulus is composed once before the window opens; each redraw only
/// copies the finished surface (or the blank background) into the frame.
pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    stimulus: Surface,
    blank: Surface,
    hidden: bool,
    session: TrialSession<HighPrecisionTimer>,
    timer: HighPrecisionTimer,
    record: Option<CompletionRecord>,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(params: &TrialParams) -> Result<Self> {
        let trial = normalize(params);
        let timer = HighPrecisionTimer::new();

        let mut compositor = Compositor::new(trial.context.clone(), timer.clone());
        let blank = compositor.new_surface().context("allocate canvas")?;
        let mut stimulus = blank.clone();
        let stats = compositor
            .render(&trial.items, &mut stimulus)
            .context("render trial")?;
        info!(
            items = stats.items,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "stimulus ready"
        );

        let session = TrialSession::new(SessionConfig::from(params), &trial.items, timer.clone());
        Ok(Self {
            window: None,
            pixels: None,
            stimulus,
            blank,
            hidden: false,
            session,
            timer,
            record: None,
            failure: None,
        })
    }

    /// Runs the event loop until the trial ends and returns its record.
    pub fn run(mut self) -> Result<CompletionRecord> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;

        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        Ok(match self.record.take() {
            Some(record) => record,
            None => self.session.finish(),
        })
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;
        if let Some(mhz) = monitor.refresh_rate_millihertz() {
            info!(refresh_hz = f64::from(mhz) / 1000.0, "display");
        }

        let attributes = Window::default_attributes()
            .with_title("percept")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        debug!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            "window created"
        );

        // The buffer keeps the trial's canvas size and is scaled to the window.
        let texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(
            self.stimulus.width(),
            self.stimulus.height(),
            texture,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let pixels = self
            .pixels
            .as_mut()
            .ok_or_else(|| anyhow!("redraw before the surface exists"))?;
        let source = if self.hidden { &self.blank } else { &self.stimulus };

        let t = self.timer.now();
        source.copy_to_frame(pixels.frame_mut())?;
        pixels.render()?;
        let frame = self.timer.elapsed(t);
        self.timer.record_frame(frame);

        if !self.hidden {
            self.session.stimulus_shown();
        }
        tracing::trace!(present_us = frame.as_micros() as u64, "frame");
        Ok(())
    }

    fn update(&mut self, event_loop: &ActiveEventLoop) {
        for event in self.session.update() {
            match event {
                SessionEvent::HideStimulus => self.hidden = true,
                SessionEvent::Timeout => debug!("no response within the trial duration"),
            }
        }
        if self.session.is_done() {
            self.finish(event_loop);
        }
    }

    fn handle_key(&mut self, key: &Key, event_loop: &ActiveEventLoop) {
        if let Key::Named(NamedKey::Escape) = key {
            warn!("trial aborted");
            self.finish(event_loop);
            return;
        }
        if let Some(name) = key_name(key) {
            self.session.respond(&name);
            if self.session.is_done() {
                self.finish(event_loop);
            }
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(width, height) {
                error!("failed to resize surface: {e}");
            }
        }
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        if self.record.is_none() {
            self.record = Some(self.session.finish());
            let stats = self.timer.calibration_stats();
            debug!(
                frames = self.timer.frame_count(),
                present_ms = stats.average_frame_time_ns / 1e6,
                jitter_ms = stats.jitter_ns / 1e6,
                "presentation timing"
            );
        }
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }
}

/// Response label for a key: the character it types, or the lowercase name
/// of a named key such as `space` or `arrowleft`.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(s) => Some(s.to_lowercase()),
        Key::Named(NamedKey::Space) => Some("space".to_string()),
        Key::Named(named) => Some(format!("{named:?}").to_lowercase()),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(event_loop, e.context("create window and surface"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.finish(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.present() {
                    self.fail(event_loop, e);
                    return;
                }
                self.update(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_key(&event.logical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size.width, size.height),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(key_name(&Key::Character("F".into())).as_deref(), Some("f"));
        assert_eq!(key_name(&Key::Named(NamedKey::Space)).as_deref(), Some("space"));
        assert_eq!(
            key_name(&Key::Named(NamedKey::ArrowLeft)).as_deref(),
            Some("arrowleft")
        );
    }
}
