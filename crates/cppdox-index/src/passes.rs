//! Single-threaded post-processing over the merged index.
//!
//! Fixed order, run after every worker has drained:
//! `prune_methods` → `resolve_namespaces` → `update_record_names` →
//! `update_member_functions` → `prune_type_refs`. Namespace child lists must
//! exist before prototypes consume them, and type-ref pruning comes last
//! because the passes before it may resolve new IDs.

use cppdox_core::{Access, Index, SymbolId, SymbolLike};
use std::collections::{HashMap, HashSet};

/// Delete member functions whose parent record was filtered out of the
/// index. A method's `parent_namespace_id` doubles as its parent-record
/// pointer.
pub fn prune_methods(index: &mut Index) {
    let record_ids: HashSet<SymbolId> = index.records.ids().into_iter().collect();
    let functions = index.functions.entries_mut();
    let dead: Vec<SymbolId> = functions
        .iter()
        .filter(|(_, f)| f.is_record_member && !record_ids.contains(&f.info.parent_namespace_id))
        .map(|(id, _)| *id)
        .collect();
    for id in &dead {
        functions.remove(id);
    }
    tracing::info!("Pruned {} functions from the database.", dead.len());
}

fn bucket_by_parent<'m, T: SymbolLike + 'm>(
    entries: impl Iterator<Item = (&'m SymbolId, &'m T)>,
) -> HashMap<SymbolId, Vec<SymbolId>> {
    let mut map: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
    for (id, symbol) in entries {
        map.entry(symbol.parent_namespace_id()).or_default().push(*id);
    }
    map
}

/// The single build of namespace child lists: a symbol is a child of the
/// namespace its parent pointer names. One bucketing sweep per kind; child
/// ordering within the lists is not guaranteed.
pub fn resolve_namespaces(index: &mut Index) {
    tracing::info!("Indexer resolving namespaces.");
    let records_by_parent = {
        let entries = index.records.entries();
        bucket_by_parent(entries.iter())
    };
    let enums_by_parent = {
        let entries = index.enums.entries();
        bucket_by_parent(entries.iter())
    };
    let aliases_by_parent = {
        let entries = index.aliases.entries();
        bucket_by_parent(entries.iter())
    };
    let namespaces_by_parent = {
        let entries = index.namespaces.entries();
        bucket_by_parent(entries.iter())
    };

    for (id, ns) in index.namespaces.entries_mut().iter_mut() {
        ns.records = records_by_parent.get(id).cloned().unwrap_or_default();
        ns.enums = enums_by_parent.get(id).cloned().unwrap_or_default();
        ns.namespaces = namespaces_by_parent.get(id).cloned().unwrap_or_default();
        ns.usings = aliases_by_parent.get(id).cloned().unwrap_or_default();
    }
    tracing::info!("Indexer namespace resolution complete.");
}

/// Append the inheritance list to each record prototype. Runs after indexing
/// so every base is certainly resolvable; an access prefix appears only when
/// the access specifier was explicitly written.
pub fn update_record_names(index: &mut Index) {
    tracing::info!("Indexer updating record names with inheritance information.");
    for record in index.records.entries_mut().values_mut() {
        if record.base_records.is_empty() {
            continue;
        }
        let mut suffix = String::from(" : ");
        for (i, base) in record.base_records.iter().enumerate() {
            if i > 0 {
                suffix.push_str(", ");
            }
            match base.access {
                Access::Public => suffix.push_str("public "),
                Access::Private => suffix.push_str("private "),
                Access::Protected => suffix.push_str("protected "),
                Access::None => {}
            }
            suffix.push_str(&base.name);
        }
        record.proto.push_str(&suffix);
    }
}

/// Rewrite canonical `type-parameter-0-i` placeholders in member-function
/// prototypes back to the owning record's template-parameter names, and
/// recompute the prototype offsets.
pub fn update_member_functions(index: &mut Index) {
    let templated_records: Vec<(Vec<SymbolId>, Vec<String>)> = {
        let entries = index.records.entries();
        entries
            .values()
            .filter(|r| !r.template_params.is_empty())
            .map(|r| {
                (
                    r.method_ids.clone(),
                    r.template_params.iter().map(|p| p.name.clone()).collect(),
                )
            })
            .collect()
    };

    let functions = index.functions.entries_mut();
    for (method_ids, param_names) in &templated_records {
        // Highest index first, so `type-parameter-0-1` never clobbers the
        // prefix of `type-parameter-0-10`.
        let substitute = |s: &str| -> String {
            let mut out = s.to_string();
            for (i, name) in param_names.iter().enumerate().rev() {
                if name.is_empty() {
                    continue;
                }
                out = out.replace(&format!("type-parameter-0-{i}"), name);
            }
            out
        };

        for method_id in method_ids {
            let Some(f) = functions.get_mut(method_id) else {
                continue;
            };
            let template_part = substitute(&f.proto[..f.post_template]);
            let pre_name_part = substitute(&f.proto[f.post_template..f.name_start]);
            let rest_part = substitute(&f.proto[f.name_start..]);
            let new_name = substitute(&f.info.name);

            let new_proto = format!("{template_part}{pre_name_part}{rest_part}");
            if new_proto != f.proto || new_name != f.info.name {
                tracing::debug!("Updating function proto from {} to {}", f.proto, new_proto);
                f.proto = new_proto;
                f.info.name = new_name;
                f.post_template = template_part.len();
                f.name_start = template_part.len() + pre_name_part.len();
            }
            for param in &mut f.params {
                param.ty.name = substitute(&param.ty.name);
                param.default_value = substitute(&param.default_value);
            }
            f.return_type.name = substitute(&f.return_type.name);
        }
    }
}

/// Null every `TypeRef.id` that does not resolve to a record, enum, or alias
/// in the index. Names are kept; only the cross-links are severed.
pub fn prune_type_refs(index: &mut Index) {
    let mut have: HashSet<SymbolId> = HashSet::new();
    have.extend(index.records.ids());
    have.extend(index.enums.ids());
    have.extend(index.aliases.ids());
    let resolvable = |id: SymbolId| id.is_null() || have.contains(&id);

    for f in index.functions.entries_mut().values_mut() {
        if !resolvable(f.return_type.id) {
            f.return_type.id = SymbolId::NULL;
        }
        for param in &mut f.params {
            if !resolvable(param.ty.id) {
                param.ty.id = SymbolId::NULL;
            }
        }
    }
    for r in index.records.entries_mut().values_mut() {
        for var in &mut r.vars {
            if !resolvable(var.ty.id) {
                var.ty.id = SymbolId::NULL;
            }
        }
    }
    for a in index.aliases.entries_mut().values_mut() {
        if !resolvable(a.target.id) {
            a.target.id = SymbolId::NULL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppdox_core::{
        BaseRecord, FunctionParam, FunctionSymbol, NamespaceSymbol, RecordSymbol, TemplateParam,
        TypeRef,
    };

    fn record(id: SymbolId, parent: SymbolId) -> RecordSymbol {
        let mut r = RecordSymbol::default();
        r.info.id = id;
        r.info.parent_namespace_id = parent;
        r
    }

    #[test]
    fn prune_methods_removes_orphans() {
        let mut index = Index::default();
        let record_id = SymbolId::from_usr("c:R:Kept");
        let gone_record_id = SymbolId::from_usr("c:R:Gone");
        index.records.reserve(record_id);
        index.records.update(record_id, record(record_id, SymbolId::NULL));

        let kept = SymbolId::from_usr("c:F:Kept::m()");
        let orphan = SymbolId::from_usr("c:F:Gone::m()");
        let free = SymbolId::from_usr("c:F:f()");
        for (id, parent, member) in [
            (kept, record_id, true),
            (orphan, gone_record_id, true),
            (free, SymbolId::NULL, false),
        ] {
            let mut f = FunctionSymbol::default();
            f.info.id = id;
            f.info.parent_namespace_id = parent;
            f.is_record_member = member;
            index.functions.reserve(id);
            index.functions.update(id, f);
        }

        prune_methods(&mut index);
        assert!(index.functions.contains(kept));
        assert!(!index.functions.contains(orphan));
        assert!(index.functions.contains(free));
    }

    #[test]
    fn resolve_namespaces_builds_child_lists() {
        let mut index = Index::default();
        let ns_id = SymbolId::from_usr("c:N:ns");
        let mut ns = NamespaceSymbol::default();
        ns.info.id = ns_id;
        index.namespaces.reserve(ns_id);
        index.namespaces.update(ns_id, ns);

        let inside = SymbolId::from_usr("c:R:ns::In");
        let outside = SymbolId::from_usr("c:R:Out");
        index.records.reserve(inside);
        index.records.update(inside, record(inside, ns_id));
        index.records.reserve(outside);
        index.records.update(outside, record(outside, SymbolId::NULL));

        resolve_namespaces(&mut index);
        let ns = index.namespaces.get(ns_id).unwrap();
        assert_eq!(ns.records, vec![inside]);
        assert!(ns.enums.is_empty());
        assert!(ns.namespaces.is_empty());
        assert!(ns.usings.is_empty());
    }

    #[test]
    fn update_record_names_appends_written_access_only() {
        let mut index = Index::default();
        let id = SymbolId::from_usr("c:R:D");
        let mut r = record(id, SymbolId::NULL);
        r.info.name = "D".into();
        r.proto = "struct D".into();
        r.base_records.push(BaseRecord {
            id: SymbolId::NULL,
            access: Access::Public,
            name: "B".into(),
        });
        r.base_records.push(BaseRecord {
            id: SymbolId::NULL,
            access: Access::None,
            name: "C".into(),
        });
        index.records.reserve(id);
        index.records.update(id, r);

        update_record_names(&mut index);
        assert_eq!(index.records.get(id).unwrap().proto, "struct D : public B, C");
    }

    #[test]
    fn update_member_functions_restores_placeholders() {
        let mut index = Index::default();
        let record_id = SymbolId::from_usr("c:R:S");
        let method_id = SymbolId::from_usr("c:F:S::f(type-parameter-0-0)");

        let mut r = record(record_id, SymbolId::NULL);
        r.template_params.push(TemplateParam {
            name: "T".into(),
            is_typename: true,
            ..TemplateParam::default()
        });
        r.method_ids.push(method_id);
        index.records.reserve(record_id);
        index.records.update(record_id, r);

        let mut f = FunctionSymbol::default();
        f.info.id = method_id;
        f.info.name = "f".into();
        f.info.parent_namespace_id = record_id;
        f.is_record_member = true;
        f.proto = "void f(type-parameter-0-0 x)".into();
        f.post_template = 0;
        f.name_start = "void ".len();
        f.params.push(FunctionParam {
            name: "x".into(),
            ty: TypeRef {
                name: "type-parameter-0-0".into(),
                id: SymbolId::NULL,
            },
            default_value: String::new(),
        });
        index.functions.reserve(method_id);
        index.functions.update(method_id, f);

        update_member_functions(&mut index);
        let f = index.functions.get(method_id).unwrap();
        assert_eq!(f.proto, "void f(T x)");
        assert_eq!(f.params[0].ty.name, "T");
        assert_eq!(&f.proto[f.name_start..f.name_start + f.info.name.len()], "f");
        assert!(f.post_template <= f.name_start && f.name_start <= f.proto.len());
    }

    #[test]
    fn high_parameter_indices_do_not_clobber_prefixes() {
        let names: Vec<String> = (0..11).map(|i| format!("P{i}")).collect();
        let substitute = |s: &str| -> String {
            let mut out = s.to_string();
            for (i, name) in names.iter().enumerate().rev() {
                out = out.replace(&format!("type-parameter-0-{i}"), name);
            }
            out
        };
        assert_eq!(
            substitute("type-parameter-0-1 a, type-parameter-0-10 b"),
            "P1 a, P10 b"
        );
    }

    #[test]
    fn prune_type_refs_severs_unresolved_links() {
        let mut index = Index::default();
        let record_id = SymbolId::from_usr("c:R:Kept");
        index.records.reserve(record_id);
        index.records.update(record_id, record(record_id, SymbolId::NULL));

        let fid = SymbolId::from_usr("c:F:f(Kept,Gone)");
        let mut f = FunctionSymbol::default();
        f.info.id = fid;
        f.return_type = TypeRef {
            name: "Gone".into(),
            id: SymbolId::from_usr("c:R:Gone"),
        };
        f.params.push(FunctionParam {
            name: "a".into(),
            ty: TypeRef {
                name: "Kept".into(),
                id: record_id,
            },
            default_value: String::new(),
        });
        index.functions.reserve(fid);
        index.functions.update(fid, f);

        prune_type_refs(&mut index);
        let f = index.functions.get(fid).unwrap();
        assert!(f.return_type.id.is_null(), "unresolved link must be severed");
        assert_eq!(f.return_type.name, "Gone", "the name is kept");
        assert_eq!(f.params[0].ty.id, record_id);
    }
}
