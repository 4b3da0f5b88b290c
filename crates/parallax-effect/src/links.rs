//! The navigation links: layout, pointer hit-testing, and per-link opacity.
//!
//! Links are stacked bars centred in the window. The container is the
//! bounding box of all bars, so the gaps between bars count as "over the
//! list" but not over any single link.

use parallax_engine::coords::{Rect, Vec2};
use parallax_engine::paint::Color;
use parallax_engine::render::Quad;

use crate::viewport::ViewportDescriptor;

/// Hover transition produced by a pointer update.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HoverEvent {
    ContainerEnter,
    ContainerLeave,
    LinkEnter(usize),
    LinkLeave(usize),
}

/// Bar geometry in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinkLayout {
    /// Bar width upper bound.
    pub max_width: f32,
    /// Bar width as a fraction of the viewport width.
    pub width_fraction: f32,
    pub bar_height: f32,
    pub gap: f32,
    /// Straight-alpha bar colour at full opacity.
    pub color: [f32; 4],
}

impl Default for LinkLayout {
    fn default() -> Self {
        Self {
            max_width: 520.0,
            width_fraction: 0.6,
            bar_height: 72.0,
            gap: 24.0,
            color: [0.92, 0.92, 0.92, 0.85],
        }
    }
}

/// State of the link elements the effect decorates.
#[derive(Debug, Clone)]
pub struct LinkList {
    layout: LinkLayout,
    rects: Vec<Rect>,
    container: Rect,
    opacities: Vec<f32>,
    hovered_link: Option<usize>,
    container_hovered: bool,
    /// Last pointer position inside the window, if any.
    pointer: Option<Vec2>,
}

impl LinkList {
    /// Lays out `count` links for `viewport`, all at full opacity.
    pub fn new(count: usize, layout: LinkLayout, viewport: &ViewportDescriptor) -> Self {
        let mut list = Self {
            layout,
            rects: Vec::with_capacity(count),
            container: Rect::default(),
            opacities: vec![1.0; count],
            hovered_link: None,
            container_hovered: false,
            pointer: None,
        };
        list.relayout_for(count, viewport);
        list
    }

    /// Recomputes bar rectangles for a new viewport and re-tests the last
    /// pointer position against them.
    ///
    /// Returns the hover transitions caused by bars moving under a pointer
    /// that stayed still.
    pub fn relayout(&mut self, viewport: &ViewportDescriptor) -> Vec<HoverEvent> {
        self.relayout_for(self.opacities.len(), viewport);
        match self.pointer {
            Some(p) => self.hit_test(p),
            None => Vec::new(),
        }
    }

    fn relayout_for(&mut self, count: usize, viewport: &ViewportDescriptor) {
        let l = &self.layout;
        let width = (viewport.width * l.width_fraction).min(l.max_width).max(0.0);
        let total = count as f32 * l.bar_height + count.saturating_sub(1) as f32 * l.gap;
        let x = (viewport.width - width) / 2.0;
        let top = (viewport.height - total) / 2.0;

        self.rects.clear();
        self.rects.extend(
            (0..count).map(|i| Rect::new(x, top + i as f32 * (l.bar_height + l.gap), width, l.bar_height)),
        );
        self.container = self
            .rects
            .iter()
            .copied()
            .reduce(Rect::union)
            .unwrap_or_default();
    }

    /// Updates hover state for a pointer at `p` and returns the transitions,
    /// leaves before enters.
    pub fn hit_test(&mut self, p: Vec2) -> Vec<HoverEvent> {
        self.pointer = Some(p);
        let in_container = !self.container.is_empty() && self.container.contains(p);
        let link = if in_container {
            self.rects.iter().position(|r| r.contains(p))
        } else {
            None
        };
        self.transition(in_container, link)
    }

    /// The pointer left the window.
    pub fn pointer_left(&mut self) -> Vec<HoverEvent> {
        self.pointer = None;
        self.transition(false, None)
    }

    fn transition(&mut self, in_container: bool, link: Option<usize>) -> Vec<HoverEvent> {
        let mut events = Vec::new();

        if self.hovered_link != link {
            if let Some(old) = self.hovered_link {
                events.push(HoverEvent::LinkLeave(old));
            }
        }
        if self.container_hovered != in_container {
            events.push(if in_container {
                HoverEvent::ContainerEnter
            } else {
                HoverEvent::ContainerLeave
            });
        }
        if self.hovered_link != link {
            if let Some(new) = link {
                events.push(HoverEvent::LinkEnter(new));
            }
        }

        self.hovered_link = link;
        self.container_hovered = in_container;
        events
    }

    /// Sets every link's opacity, clamped to [0, 1].
    pub fn set_all_opacity(&mut self, opacity: f32) {
        let o = opacity.clamp(0.0, 1.0);
        self.opacities.iter_mut().for_each(|v| *v = o);
    }

    /// Bars ready for the quad renderer.
    pub fn quads(&self) -> Vec<Quad> {
        let [r, g, b, a] = self.layout.color;
        let base = Color::from_straight(r, g, b, a);
        self.rects
            .iter()
            .zip(&self.opacities)
            .map(|(&rect, &o)| Quad {
                rect,
                color: base.with_opacity(o),
            })
            .collect()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn hovered_link(&self) -> Option<usize> {
        self.hovered_link
    }

    pub fn len(&self) -> usize {
        self.opacities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opacities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HoverEvent::*;

    fn list() -> LinkList {
        // 1000x1000: bars 520 wide at x = 240, block of 4*72 + 3*24 = 360 tall
        // starting at y = 320.
        LinkList::new(4, LinkLayout::default(), &ViewportDescriptor::new(1000.0, 1000.0, 1.0, 1000.0))
    }

    fn centre_of(l: &LinkList, i: usize) -> Vec2 {
        let r = l.rects()[i];
        Vec2::new(r.origin.x + r.size.x / 2.0, r.origin.y + r.size.y / 2.0)
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn bars_are_stacked_and_centred() {
        let l = list();
        assert_eq!(l.rects()[0], Rect::new(240.0, 320.0, 520.0, 72.0));
        assert_eq!(l.rects()[3], Rect::new(240.0, 608.0, 520.0, 72.0));
        assert_eq!(l.container(), Rect::new(240.0, 320.0, 520.0, 360.0));
    }

    #[test]
    fn relayout_follows_viewport() {
        let mut l = list();
        assert_eq!(l.relayout(&ViewportDescriptor::new(500.0, 1000.0, 1.0, 1000.0)), vec![]);
        assert_eq!(l.rects()[0].size.x, 300.0);
        assert_eq!(l.rects()[0].origin.x, 100.0);
    }

    #[test]
    fn relayout_away_from_still_pointer_leaves_hover() {
        let mut l = list();
        assert_eq!(l.hit_test(Vec2::new(700.0, 356.0)), vec![ContainerEnter, LinkEnter(0)]);

        // Bars shrink to 240 wide at x = 80; x = 700 is now right of the list.
        let events = l.relayout(&ViewportDescriptor::new(400.0, 1000.0, 1.0, 1000.0));
        assert_eq!(events, vec![LinkLeave(0), ContainerLeave]);
        assert_eq!(l.hovered_link(), None);
    }

    #[test]
    fn relayout_under_still_pointer_enters_hover() {
        // 1000x2000: the list starts at y = 820, well below the pointer.
        let mut l = LinkList::new(4, LinkLayout::default(), &ViewportDescriptor::new(1000.0, 2000.0, 1.0, 1000.0));
        assert_eq!(l.hit_test(Vec2::new(500.0, 356.0)), vec![]);

        let events = l.relayout(&ViewportDescriptor::new(1000.0, 1000.0, 1.0, 1000.0));
        assert_eq!(events, vec![ContainerEnter, LinkEnter(0)]);
    }

    #[test]
    fn relayout_after_pointer_left_reports_nothing() {
        let mut l = list();
        l.hit_test(centre_of(&l, 0));
        l.pointer_left();
        assert_eq!(l.relayout(&ViewportDescriptor::new(400.0, 1000.0, 1.0, 1000.0)), vec![]);
    }

    // ── hit testing ───────────────────────────────────────────────────────

    #[test]
    fn entering_a_link_enters_container_first() {
        let mut l = list();
        let p = centre_of(&l, 2);
        assert_eq!(l.hit_test(p), vec![ContainerEnter, LinkEnter(2)]);
        assert_eq!(l.hit_test(p), vec![]);
        assert_eq!(l.hovered_link(), Some(2));
    }

    #[test]
    fn moving_between_links_leaves_then_enters() {
        let mut l = list();
        l.hit_test(centre_of(&l, 0));
        assert_eq!(l.hit_test(centre_of(&l, 1)), vec![LinkLeave(0), LinkEnter(1)]);
    }

    #[test]
    fn gap_is_inside_container_but_outside_links() {
        let mut l = list();
        l.hit_test(centre_of(&l, 0));
        assert_eq!(l.hit_test(Vec2::new(500.0, 400.0)), vec![LinkLeave(0)]);
        assert_eq!(l.hovered_link(), None);
    }

    #[test]
    fn leaving_the_list_leaves_link_then_container() {
        let mut l = list();
        l.hit_test(centre_of(&l, 3));
        assert_eq!(l.hit_test(Vec2::new(10.0, 10.0)), vec![LinkLeave(3), ContainerLeave]);
        assert_eq!(l.hit_test(Vec2::new(20.0, 10.0)), vec![]);
    }

    #[test]
    fn pointer_left_window_clears_hover() {
        let mut l = list();
        l.hit_test(centre_of(&l, 1));
        assert_eq!(l.pointer_left(), vec![LinkLeave(1), ContainerLeave]);
        assert_eq!(l.pointer_left(), vec![]);
    }

    // ── opacity ───────────────────────────────────────────────────────────

    #[test]
    fn opacity_applies_to_every_bar() {
        let mut l = list();
        l.set_all_opacity(0.2);
        assert!(l.opacities().iter().all(|&o| o == 0.2));

        let quads = l.quads();
        assert_eq!(quads.len(), 4);
        assert!((quads[0].color.a - 0.85 * 0.2).abs() < 1e-6);

        l.set_all_opacity(3.0);
        assert!(l.opacities().iter().all(|&o| o == 1.0));
    }
}
