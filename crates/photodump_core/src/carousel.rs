#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Modal image browser over one gallery snapshot. Rebuilt on every open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    images: Vec<String>,
    index: usize,
}

impl Carousel {
    /// Returns `None` when `origin` is not part of `gallery`.
    pub fn open(origin: &str, gallery: Vec<String>) -> Option<Self> {
        let index = gallery.iter().position(|src| src == origin)?;
        Some(Self {
            images: gallery,
            index,
        })
    }

    pub fn navigate(&mut self, direction: Direction) {
        let len = self.images.len();
        if len <= 1 {
            return;
        }
        let len = len as isize;
        self.index = ((self.index as isize + direction.step() + len) % len) as usize;
    }

    pub fn current(&self) -> &str {
        &self.images[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn shows_navigation(&self) -> bool {
        self.images.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::{Carousel, Direction};

    fn gallery(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("/uploads/{n}")).collect()
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut carousel =
            Carousel::open("/uploads/b.png", gallery(&["a.png", "b.png", "c.png"])).unwrap();
        assert_eq!(carousel.index(), 1);

        carousel.navigate(Direction::Next);
        carousel.navigate(Direction::Next);
        assert_eq!(carousel.current(), "/uploads/a.png");

        carousel.navigate(Direction::Previous);
        assert_eq!(carousel.current(), "/uploads/c.png");
        assert!(carousel.shows_navigation());
    }

    #[test]
    fn single_image_hides_navigation() {
        let mut carousel = Carousel::open("/uploads/a.png", gallery(&["a.png"])).unwrap();
        carousel.navigate(Direction::Next);
        assert_eq!(carousel.current(), "/uploads/a.png");
        assert!(!carousel.shows_navigation());
    }

    #[test]
    fn unknown_origin_opens_nothing() {
        assert!(Carousel::open("/uploads/zz.png", gallery(&["a.png"])).is_none());
        assert!(Carousel::open("/uploads/a.png", Vec::new()).is_none());
    }
}
