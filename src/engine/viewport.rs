use super::window::{ScrollCorrection, ScrollMetrics, ViewportSize, WindowController};

/// The host's scroll container as seen by the layout core.
pub trait ViewportSensor {
    /// Current viewport size, if the container has been laid out.
    fn observe_resize(&mut self) -> Option<ViewportSize>;

    /// Whether the horizontal content span `[start, end)` is on screen.
    fn observe_intersection(&self, start: f32, end: f32) -> bool {
        let metrics = self.scroll_metrics();
        end > metrics.scroll_left && start < metrics.scroll_left + metrics.client_width
    }

    fn scroll_metrics(&self) -> ScrollMetrics;

    fn scroll_to(&mut self, x: f32);
}

/// Feed one frame of viewport observations into the controller.
///
/// `header_ready` tells whether the header for the controller's current
/// range has been rebuilt; corrections are only applied once it has.
/// Returns `true` when the range changed and the host must rebuild.
pub fn drive_window(
    controller: &mut WindowController,
    sensor: &mut dyn ViewportSensor,
    header_ready: bool,
) -> bool {
    if let Some(size) = sensor.observe_resize() {
        controller.on_resize(size);
    }
    if header_ready {
        if let Some(ScrollCorrection { target, .. }) = controller.on_layout() {
            sensor.scroll_to(target);
        }
    }
    controller.on_scroll(sensor.scroll_metrics())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// In-memory scroll container.
    #[derive(Debug, Default)]
    pub struct FakeViewport {
        pub size: Option<ViewportSize>,
        pub metrics: ScrollMetrics,
        pub scrolls: Vec<f32>,
    }

    impl ViewportSensor for FakeViewport {
        fn observe_resize(&mut self) -> Option<ViewportSize> {
            self.size
        }

        fn scroll_metrics(&self) -> ScrollMetrics {
            self.metrics
        }

        fn scroll_to(&mut self, x: f32) {
            self.scrolls.push(x);
            self.metrics.scroll_left = x;
        }
    }
}
