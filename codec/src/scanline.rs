/// Union-find over the columns of a single scanline.
///
/// Two columns share a class when stereo fusion requires them to show the
/// same output pixel. Links always point to lower-or-equal column indices,
/// so the canonical root of every class is its smallest member — this keeps
/// encoding reproducible for identical inputs.
///
/// The structure is semantically per-row: call [`RowLinks::reset`] before
/// reusing it for the next scanline. Nothing may carry over between rows.
pub struct RowLinks {
    link: Vec<usize>,
}

impl RowLinks {
    pub fn new(width: usize) -> Self {
        Self {
            link: (0..width).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.link.len()
    }

    /// Re-initialize every column to its own root without reallocating.
    pub fn reset(&mut self) {
        for (i, l) in self.link.iter_mut().enumerate() {
            *l = i;
        }
    }

    /// Root of `x`'s class, compressing the traversed path.
    ///
    /// Compression only shortens future lookups; it never changes the
    /// partition itself.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.link[root] != root {
            root = self.link[root];
        }
        let mut cur = x;
        while self.link[cur] != root {
            let next = self.link[cur];
            self.link[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the classes of `a` and `b`, keeping the smaller root canonical.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if ra < rb {
            self.link[rb] = ra;
        } else {
            self.link[ra] = rb;
        }
    }
}
