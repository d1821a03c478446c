use ratatui::layout::Rect;

/// Fixed-size rect centered in `area`, shrunk to fit when the terminal
/// is smaller than the popup.
#[must_use]
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_within_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered(area, 60, 20);
        assert_eq!(rect, Rect::new(20, 10, 60, 20));
    }

    #[test]
    fn clamps_to_small_terminals() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered(area, 60, 20);
        assert_eq!(rect, Rect::new(0, 0, 30, 10));
    }
}
