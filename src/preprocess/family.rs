use crate::ast::{Ast, Family, NodeId};

/// Rebuilds every [`Family`] from the lists nodes own. Only children set
/// `first_child` and `last_child`; the other lists just link siblings.
pub(super) fn link(ast: &mut Ast) {
    let mut siblings: Vec<(NodeId, Family)> = Vec::new();
    let mut ends: Vec<(NodeId, Option<NodeId>, Option<NodeId>)> = Vec::new();
    for id in ast.ids() {
        let children = ast[id].children();
        if ast[id].is_parent() {
            ends.push((id, children.first().copied(), children.last().copied()));
        }
        for list in ast.owned_lists(id) {
            for (i, child) in list.iter().enumerate() {
                let family = Family {
                    parent: Some(id),
                    prev: i.checked_sub(1).map(|p| list[p]),
                    next: list.get(i + 1).copied(),
                    ..Family::default()
                };
                siblings.push((*child, family));
            }
        }
    }

    for id in ast.ids() {
        ast[id].family = Family::default();
    }
    for (id, family) in siblings {
        ast[id].family = family;
    }
    for (id, first_child, last_child) in ends {
        ast[id].family.first_child = first_child;
        ast[id].family.last_child = last_child;
    }
    log::trace!("linked families of {} nodes", ast.len());
}

#[cfg(test)]
mod tests {
    use crate::ast::parse_ast;

    use super::*;

    #[test]
    fn test_siblings_and_parents() {
        let mut ast = parse_ast("<ul><li>a</li><li>b</li></ul>").unwrap();
        link(&mut ast);

        let ul = ast[ast.root()].children()[0];
        let items = ast[ul].children().to_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(ast[items[0]].family.next, Some(items[1]));
        assert_eq!(ast[items[1]].family.prev, Some(items[0]));
        assert_eq!(ast[items[0]].family.prev, None);
        assert_eq!(ast[items[1]].family.parent, Some(ul));
        assert_eq!(ast[ul].family.first_child, Some(items[0]));
        assert_eq!(ast[ul].family.last_child, Some(items[1]));
        assert_eq!(ast[ul].family.parent, Some(ast.root()));
    }

    #[test]
    fn test_attributes_are_linked_to_their_element() {
        let mut ast = parse_ast("<a href=\"{{ url }}\" class=x>t</a>").unwrap();
        link(&mut ast);

        let a = ast[ast.root()].children()[0];
        let attributes = ast[a].attributes().to_vec();
        assert_eq!(ast[attributes[0]].family.parent, Some(a));
        assert_eq!(ast[attributes[0]].family.next, Some(attributes[1]));
        // attributes are not children
        assert_eq!(ast[a].family.first_child, ast[a].children().first().copied());
        assert_ne!(ast[a].family.first_child, Some(attributes[0]));

        let value = ast.owned_lists(attributes[0])[0][0];
        assert_eq!(ast[value].family.parent, Some(attributes[0]));
    }

    #[test]
    fn test_branches_link_to_their_tag() {
        let mut ast = parse_ast("{% if a %}x{% else %}y{% endif %}").unwrap();
        link(&mut ast);

        let tag = ast[ast.root()].children()[0];
        let branches = ast[tag].children().to_vec();
        assert_eq!(branches.len(), 2);
        assert_eq!(ast[branches[0]].family.parent, Some(tag));
        assert_eq!(ast[branches[0]].family.next, Some(branches[1]));
        let text = ast[branches[1]].children()[0];
        assert_eq!(ast[text].family.parent, Some(branches[1]));
        assert_eq!(ast[text].family.prev, None);
    }
}
