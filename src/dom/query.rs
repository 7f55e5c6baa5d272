use super::*;

/// Which elements a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// The root and everything under it.
    Inclusive,
    Descendants,
}

impl Dom {
    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    /// Matching elements in document order.
    fn select(
        &self,
        root: NodeId,
        selector: &str,
        scope: Scope,
    ) -> Result<impl Iterator<Item = NodeId> + '_> {
        let groups = parse_selector_groups(selector)?;
        let mut candidates = Vec::new();
        match scope {
            Scope::Inclusive => self.collect_elements_dfs(root, &mut candidates),
            Scope::Descendants => {
                for child in self.children(root) {
                    self.collect_elements_dfs(*child, &mut candidates);
                }
            }
        }
        Ok(candidates.into_iter().filter(move |candidate| {
            groups
                .iter()
                .any(|chain| self.matches_selector_chain(*candidate, chain))
        }))
    }

    /// First element matching `selector` in document order, starting at `root`
    /// itself.
    pub(crate) fn query_selector_inclusive(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        Ok(self.select(root, selector, Scope::Inclusive)?.next())
    }

    pub(crate) fn query_selector_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        Ok(self.select(root, selector, Scope::Descendants)?.next())
    }

    pub(crate) fn query_selector_all_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        Ok(self.select(root, selector, Scope::Descendants)?.collect())
    }

    fn ancestors(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node_id), move |node| self.parent(*node))
    }

    fn element_siblings(&self, node_id: NodeId) -> Vec<NodeId> {
        match self.parent(node_id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|child| self.element(*child).is_some())
                .collect(),
            None => vec![node_id],
        }
    }

    /// Element siblings before `node_id`, nearest first.
    fn preceding_element_siblings(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> {
        let mut siblings = self.element_siblings(node_id);
        let before = siblings
            .iter()
            .position(|sibling| *sibling == node_id)
            .unwrap_or(0);
        siblings.truncate(before);
        siblings.into_iter().rev()
    }

    pub(crate) fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        let tag_matches = match (&step.tag, step.universal) {
            (Some(_), true) => false,
            (Some(tag), false) => element.tag_name.eq_ignore_ascii_case(tag),
            (None, _) => true,
        };
        if !tag_matches
            || step.id.as_ref().is_some_and(|id| element.attrs.get("id") != Some(id))
            || !step.classes.iter().all(|class_name| has_class(element, class_name))
            || !step.attrs.iter().all(|cond| cond.matches(&element.attrs))
        {
            return false;
        }

        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::FirstChild => {
                self.element_siblings(node_id).first() == Some(&node_id)
            }
            SelectorPseudoClass::LastChild => {
                self.element_siblings(node_id).last() == Some(&node_id)
            }
            SelectorPseudoClass::OnlyChild => self.element_siblings(node_id).len() == 1,
            SelectorPseudoClass::Checked => element.checked,
            SelectorPseudoClass::Disabled => element.disabled,
            SelectorPseudoClass::Enabled => !element.disabled,
            SelectorPseudoClass::Empty => self
                .children(node_id)
                .iter()
                .all(|child| matches!(self.nodes[child.0].node_type, NodeType::Comment(_))),
            SelectorPseudoClass::Not(chains) => !chains
                .iter()
                .any(|chain| self.matches_selector_chain(node_id, chain)),
        })
    }

    /// Matches right to left, taking the nearest qualifying relative for each
    /// combinator.
    pub(crate) fn matches_selector_chain(&self, node_id: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        let mut current = node_id;
        let mut combinator = last.combinator;
        for part in rest.iter().rev() {
            let step = &part.step;
            let matches = |candidate: &NodeId| self.matches_step(*candidate, step);
            let related = match combinator.unwrap_or(SelectorCombinator::Descendant) {
                SelectorCombinator::Child => self.parent(current).filter(matches),
                SelectorCombinator::Descendant => self.ancestors(current).find(matches),
                SelectorCombinator::AdjacentSibling => {
                    self.preceding_element_siblings(current).next().filter(matches)
                }
                SelectorCombinator::GeneralSibling => {
                    self.preceding_element_siblings(current).find(matches)
                }
            };
            let Some(related) = related else {
                return false;
            };
            current = related;
            combinator = part.combinator;
        }
        true
    }
}

impl SelectorAttrCondition {
    fn matches(&self, attrs: &BTreeMap<String, String>) -> bool {
        let (key, expected) = match self {
            Self::Exists { key } => return attrs.contains_key(key),
            Self::Eq { key, value }
            | Self::StartsWith { key, value }
            | Self::EndsWith { key, value }
            | Self::Contains { key, value }
            | Self::Includes { key, value }
            | Self::DashMatch { key, value } => (key, value.as_str()),
        };
        let Some(actual) = attrs.get(key).map(String::as_str) else {
            return false;
        };
        match self {
            Self::Exists { .. } | Self::Eq { .. } => actual == expected,
            Self::StartsWith { .. } => actual.starts_with(expected),
            Self::EndsWith { .. } => actual.ends_with(expected),
            Self::Contains { .. } => actual.contains(expected),
            Self::Includes { .. } => actual.split_whitespace().any(|token| token == expected),
            Self::DashMatch { .. } => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}
