//! Sequential union-find over 1-based labels.

#[derive(Debug)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
    next_label: u32,
}

impl UnionFind {
    pub(crate) fn new() -> Self {
        Self {
            parent: Vec::with_capacity(256),
            next_label: 1,
        }
    }

    /// Union-find with labels `1..=n` already allocated.
    pub(crate) fn with_sets(n: usize) -> Self {
        let mut uf = Self::new();
        for _ in 0..n {
            uf.make_set();
        }
        uf
    }

    #[inline]
    pub(crate) fn make_set(&mut self) -> u32 {
        let label = self.next_label;
        self.parent.push(label);
        self.next_label += 1;
        label
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.parent.len()
    }

    /// Find root with iterative path compression (two-pass).
    pub(crate) fn find(&mut self, label: u32) -> u32 {
        debug_assert!(label >= 1 && (label as usize) <= self.parent.len());

        let mut root = label;
        loop {
            let parent = self.parent[(root - 1) as usize];
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut current = label;
        while current != root {
            let idx = (current - 1) as usize;
            let parent = self.parent[idx];
            self.parent[idx] = root;
            current = parent;
        }

        root
    }

    /// Join two sets. The smaller root label survives.
    pub(crate) fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (smaller, larger) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[(larger - 1) as usize] = smaller;
        }
    }

    /// Map every label to a sequential component number starting at 0.
    ///
    /// Components are numbered in order of their smallest label, so the
    /// result only depends on the set of unions, not on their order.
    pub(crate) fn flatten(&mut self) -> (Vec<usize>, usize) {
        let len = self.parent.len();
        let mut root_component = vec![usize::MAX; len + 1];
        let mut components = Vec::with_capacity(len);
        let mut count = 0;

        for label in 1..=len as u32 {
            let root = self.find(label) as usize;
            if root_component[root] == usize::MAX {
                root_component[root] = count;
                count += 1;
            }
            components.push(root_component[root]);
        }

        (components, count)
    }
}
