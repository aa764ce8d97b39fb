// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }
}

/// Cell grid with dirty tracking. `set` records changed indices so the
/// presenter only has to touch what moved this frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Re-derive the grid for new dimensions. A resize to the current
    /// dimensions leaves every cell untouched, so repeated resize events
    /// from the host are safe to forward unconditionally.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(len, self.blank);
        self.dirty_map.clear();
        self.dirty_map.resize(len, false);
        self.dirty.clear();
        self.dirty_all = true;
    }

    pub fn fill(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank_with_bg(bg);
        self.cells.fill(self.blank);
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }
        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    pub fn clear_cell(&mut self, x: u16, y: u16) {
        let blank = self.blank;
        self.set(x, y, blank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_marks_cell_dirty_once() {
        let mut f = Frame::new(4, 2, None);
        f.clear_dirty();

        let cell = Cell {
            ch: 'x',
            fg: None,
            bg: None,
            bold: false,
        };
        f.set(1, 0, cell);
        f.set(1, 0, cell);
        assert_eq!(f.dirty_indices(), &[1]);
        assert_eq!(f.get(1, 0).unwrap().ch, 'x');
    }

    #[test]
    fn resize_to_same_dims_is_idempotent() {
        let mut f = Frame::new(6, 3, None);
        f.clear_dirty();
        f.set(
            2,
            1,
            Cell {
                ch: 'y',
                fg: None,
                bg: None,
                bold: false,
            },
        );

        let dirty_before = f.dirty_indices().to_vec();
        f.resize(6, 3);
        f.resize(6, 3);

        assert_eq!(f.get(2, 1).unwrap().ch, 'y');
        assert_eq!(f.dirty_indices(), dirty_before.as_slice());
        assert!(!f.is_dirty_all());
    }

    #[test]
    fn resize_to_new_dims_resets_cells() {
        let mut f = Frame::new(4, 4, None);
        f.set(
            0,
            0,
            Cell {
                ch: 'z',
                fg: None,
                bg: None,
                bold: false,
            },
        );
        f.resize(8, 2);
        assert!(f.is_dirty_all());
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
        assert!(f.get(0, 3).is_none());
    }

    #[test]
    fn fill_makes_cells_blank() {
        let mut f = Frame::new(2, 2, None);
        f.set(
            0,
            0,
            Cell {
                ch: 'x',
                fg: None,
                bg: None,
                bold: false,
            },
        );
        f.fill(None);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }
}
