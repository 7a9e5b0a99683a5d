use crate::xml_tree::{Element, Node, XmlTree};
use tracing::warn;

pub const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Hex value written into `w:color` for every run lifted out of a hyperlink
pub const BLACK: &str = "000000";

/// Unwraps `w:hyperlink` elements in a WordprocessingML part, keeping their runs
pub struct LinkStripper {
    hyperlink: String,
    run: String,
    run_props: String,
    color: String,
    val: String,
}

impl LinkStripper {
    /// Names qualified with `prefix`, normally `w`.
    pub fn new(prefix: &str) -> Self {
        Self {
            hyperlink: format!("{prefix}:hyperlink"),
            run: format!("{prefix}:r"),
            run_props: format!("{prefix}:rPr"),
            color: format!("{prefix}:color"),
            val: format!("{prefix}:val"),
        }
    }

    /// Use whatever prefix the part binds to the WordprocessingML namespace.
    pub fn for_tree(tree: &XmlTree) -> Self {
        let prefix = tree
            .prefix_for(WORDPROCESSING_NS)
            .unwrap_or_else(|| "w".to_string());
        Self::new(&prefix)
    }

    /// Strip every hyperlink in the tree, returning how many were removed.
    ///
    /// The whole part is walked, so paragraphs in the body, in table cells at
    /// any nesting depth and in content controls are all reached.
    pub fn strip(&self, tree: &mut XmlTree) -> usize {
        self.unwrap_in(&mut tree.nodes)
    }

    fn unwrap_in(&self, children: &mut Vec<Node>) -> usize {
        // Children first: a hyperlink nested in another one is unwrapped into
        // its parent before the parent itself is unwrapped.
        let mut removed = 0;
        for node in children.iter_mut() {
            if let Node::Element(el) = node {
                removed += self.unwrap_in(&mut el.children);
            }
        }

        if !children.iter().any(|node| node.is_named(&self.hyperlink)) {
            return removed;
        }

        // Rebuild the sibling list instead of editing it while walking it.
        for node in std::mem::take(children) {
            match node {
                Node::Element(link) if link.is_named(&self.hyperlink) => {
                    removed += 1;
                    for child in link.children {
                        match child {
                            Node::Element(mut run) if run.is_named(&self.run) => {
                                self.force_black(&mut run);
                                children.push(Node::Element(run));
                            }
                            Node::Element(other) => {
                                let text = other.text();
                                if !text.is_empty() {
                                    warn!(
                                        element = %String::from_utf8_lossy(other.name()),
                                        %text,
                                        "hyperlink content outside a run was dropped"
                                    );
                                }
                            }
                            Node::Other(_) => {}
                        }
                    }
                }
                other => children.push(other),
            }
        }
        removed
    }

    fn force_black(&self, run: &mut Element) {
        if let Some(props) = run.child_or_insert_first(&self.run_props) {
            props.children.retain(|node| !node.is_named(&self.color));
            props.children.push(Node::Element(
                Element::new(self.color.as_str()).with_attribute(&self.val, BLACK),
            ));
        }
    }
}
