use std::time::Duration;

use ratatui::DefaultTerminal;
use ratatui_image::picker::Picker;

use super::App;
use crate::app::event_handlers::EventHandlers;

/// Font size assumed when the terminal does not answer the graphics query
const FALLBACK_FONT_SIZE: (u16, u16) = (8, 16);

/// Trait for main application loop
pub trait AppMainLoop {
    async fn run(self, terminal: DefaultTerminal) -> color_eyre::Result<()>
    where
        Self: Sized;
}

impl AppMainLoop for App {
    /// Run the application's main loop.
    async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;

        let mut events_rx = self
            .events_rx
            .take()
            .ok_or_else(|| color_eyre::eyre::eyre!("Event channel already in use"))?;

        // Set up the image picker for cover art
        let mut picker = Picker::from_query_stdio().unwrap_or_else(|e| {
            log::warn!("Terminal graphics query failed, using font size fallback: {}", e);
            Picker::from_fontsize(FALLBACK_FONT_SIZE)
        });
        picker.set_background_color([0, 0, 0, 0]);
        self.picker = Some(picker);

        log::info!("Loading library from {}", self.config.server.base_url);
        self.reload_library();

        // Set up signal handlers for graceful shutdown (Unix only)
        #[cfg(unix)]
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        log::info!("Entering event-driven main loop");

        while self.running {
            terminal.draw(|frame| crate::app::ui::render(frame, &mut self))?;

            if let Some(protocol) = self
                .cover_image
                .as_mut()
                .and_then(|cover| cover.protocol.as_mut())
                && let Some(Err(e)) = protocol.last_encoding_result()
            {
                log::debug!("Cover encoding failed: {}", e);
            }

            tokio::select! {
                // Keyboard events (with short timeout for responsive UI)
                _ = tokio::time::sleep(Duration::from_millis(10)) => {
                    if crossterm::event::poll(Duration::from_millis(0))? {
                        self.handle_crossterm_events()?;
                    }
                }

                // Results of background library, cover and audio requests
                Some(event) = events_rx.recv() => {
                    self.handle_app_event(event);
                }
            }

            // Check for Unix signals outside of select! to avoid conditional compilation issues
            #[cfg(unix)]
            {
                use std::pin::Pin;
                use std::task::Poll;

                let waker = futures::task::noop_waker();
                let mut cx = std::task::Context::from_waker(&waker);

                if let Poll::Ready(Some(())) = Pin::new(&mut sigint).poll_recv(&mut cx) {
                    log::info!("Received SIGINT, shutting down gracefully");
                    self.quit();
                }

                if let Poll::Ready(Some(())) = Pin::new(&mut sigterm).poll_recv(&mut cx) {
                    log::info!("Received SIGTERM, shutting down gracefully");
                    self.quit();
                }
            }
        }

        log::info!("Exiting main loop");

        self.playback.stop();
        self.resolver.cache().read().await.log_stats();

        Ok(())
    }
}
