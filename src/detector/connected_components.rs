//! Connected components over a binarized sheet
//! Labels 8-connected ink regions in two raster passes and reports area and bounds

use crate::models::BitMatrix;

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of `x`, halving the path on the way up
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge the sets of `x` and `y`
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            // Smaller label stays root so labels keep raster order
            let (keep, merge) = if root_x < root_y { (root_x, root_y) } else { (root_y, root_x) };
            self.parent[merge as usize] = keep;
        }
    }
}

/// One ink region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Pixel count
    pub area: usize,
    /// Leftmost column
    pub min_x: usize,
    /// Top row
    pub min_y: usize,
    /// Inclusive
    pub max_x: usize,
    /// Inclusive
    pub max_y: usize,
}

/// Find connected dark regions, ordered by the raster position of their first pixel
pub fn find_components(matrix: &BitMatrix) -> Vec<Component> {
    let width = matrix.width();
    let height = matrix.height();

    let mut labels = vec![0u32; width * height];
    // Label 0 is background
    let mut uf = UnionFind::new(1);
    let mut next_label = 1u32;

    // First pass: provisional labels from the already visited neighbors
    for y in 0..height {
        for x in 0..width {
            if !matrix.get(x, y) {
                continue;
            }

            let mut neighbors = [0u32; 4];
            if x > 0 {
                neighbors[0] = labels[y * width + x - 1];
            }
            if y > 0 {
                neighbors[1] = labels[(y - 1) * width + x];
                if x > 0 {
                    neighbors[2] = labels[(y - 1) * width + x - 1];
                }
                if x + 1 < width {
                    neighbors[3] = labels[(y - 1) * width + x + 1];
                }
            }

            let idx = y * width + x;
            match neighbors.iter().copied().filter(|&l| l != 0).min() {
                None => {
                    labels[idx] = next_label;
                    uf.parent.push(next_label);
                    next_label += 1;
                }
                Some(min_label) => {
                    labels[idx] = min_label;
                    for &l in &neighbors {
                        if l != 0 && l != min_label {
                            uf.union(min_label, l);
                        }
                    }
                }
            }
        }
    }

    // Second pass: accumulate per root
    let mut slots: Vec<Option<Component>> = vec![None; next_label as usize];
    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label) as usize;
            let entry = slots[root].get_or_insert(Component {
                area: 0,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });
            entry.area += 1;
            entry.min_x = entry.min_x.min(x);
            entry.min_y = entry.min_y.min(y);
            entry.max_x = entry.max_x.max(x);
            entry.max_y = entry.max_y.max(y);
        }
    }

    slots.into_iter().flatten().collect()
}
