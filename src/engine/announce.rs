//! Text for assistive technology. Surfacing it is the renderer's job.

use crate::events::Slide;

pub fn slide_changed(index: usize, slide: &Slide, total: usize) -> String {
    format!("Slide {} of {}: {}", index + 1, total, slide.label)
}

pub fn pause_changed(paused: bool) -> String {
    if paused {
        "Slideshow paused".to_owned()
    } else {
        "Slideshow playing".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_text_is_one_based() {
        let slide = Slide::new("Harbour at dusk", "img/harbour.jpg");
        assert_eq!(slide_changed(0, &slide, 4), "Slide 1 of 4: Harbour at dusk");
        assert_eq!(slide_changed(3, &slide, 4), "Slide 4 of 4: Harbour at dusk");
    }

    #[test]
    fn pause_text() {
        assert_eq!(pause_changed(true), "Slideshow paused");
        assert_eq!(pause_changed(false), "Slideshow playing");
    }
}
