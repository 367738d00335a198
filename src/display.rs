//! The boundary between the coordinator and whatever draws the organisms.

use crate::population::Species;
use glam::Vec2;

/// One tick's worth of normalized positions, borrowed from the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub tick: u64,
    pub plants: &'a [Vec2],
    pub herbivores: &'a [Vec2],
    pub predators: &'a [Vec2],
}

impl<'a> Frame<'a> {
    pub fn positions(&self, species: Species) -> &'a [Vec2] {
        match species {
            Species::Plant => self.plants,
            Species::Herbivore => self.herbivores,
            Species::Predator => self.predators,
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.positions(species).len()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderControl {
    Continue,
    Quit,
}

/// Receives every frame; may ask the coordinator to stop the run.
pub trait Renderer {
    fn present(&mut self, frame: &Frame<'_>) -> RenderControl;
}

impl<F> Renderer for F
where
    F: FnMut(&Frame<'_>) -> RenderControl,
{
    fn present(&mut self, frame: &Frame<'_>) -> RenderControl {
        self(frame)
    }
}

/// Logs population counts instead of drawing; optionally stops after a tick limit.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    report_interval: u64,
    tick_limit: Option<u64>,
}

impl HeadlessRenderer {
    pub fn new(report_interval: u64) -> Self {
        Self {
            report_interval: report_interval.max(1),
            tick_limit: None,
        }
    }

    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }
}

impl Renderer for HeadlessRenderer {
    fn present(&mut self, frame: &Frame<'_>) -> RenderControl {
        if frame.tick % self.report_interval == 0 {
            log::info!(
                "tick {}: plants={}, herbivores={}, predators={}",
                frame.tick,
                frame.plants.len(),
                frame.herbivores.len(),
                frame.predators.len()
            );
        }
        match self.tick_limit {
            Some(limit) if frame.tick >= limit => {
                log::info!("tick limit {} reached, requesting stop", limit);
                RenderControl::Quit
            }
            _ => RenderControl::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64, plants: &[Vec2]) -> Frame<'_> {
        Frame {
            tick,
            plants,
            herbivores: &[],
            predators: &[],
        }
    }

    #[test]
    fn test_headless_tick_limit() {
        let mut renderer = HeadlessRenderer::new(10).with_tick_limit(3);
        assert_eq!(renderer.present(&frame(1, &[])), RenderControl::Continue);
        assert_eq!(renderer.present(&frame(2, &[])), RenderControl::Continue);
        assert_eq!(renderer.present(&frame(3, &[])), RenderControl::Quit);
    }

    #[test]
    fn test_headless_without_limit_never_quits() {
        let mut renderer = HeadlessRenderer::new(0);
        for tick in 1..500 {
            assert_eq!(renderer.present(&frame(tick, &[])), RenderControl::Continue);
        }
    }

    fn counting(seen: &mut Vec<usize>) -> impl FnMut(&Frame<'_>) -> RenderControl {
        move |f| {
            seen.push(f.count(Species::Plant));
            RenderControl::Quit
        }
    }

    #[test]
    fn test_closure_renderer_and_counts() {
        let plants = [Vec2::ZERO, Vec2::ONE];
        let mut seen = Vec::new();
        {
            let mut renderer = counting(&mut seen);
            assert_eq!(renderer.present(&frame(1, &plants)), RenderControl::Quit);
        }
        assert_eq!(seen, vec![2]);
    }
}
