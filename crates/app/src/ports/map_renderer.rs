//! Map renderer port: the map-drawing collaborator.

use mapcard_domain::map::MapView;

/// Draws the markers and paths of a [`MapView`].
pub trait MapRenderer {
    /// Draw (or redraw) the map.
    fn render(&mut self, view: &MapView);

    /// Re-center the map on everything it currently shows.
    fn fit_map(&mut self);
}

impl<T: MapRenderer + ?Sized> MapRenderer for &mut T {
    fn render(&mut self, view: &MapView) {
        (**self).render(view);
    }

    fn fit_map(&mut self) {
        (**self).fit_map();
    }
}
