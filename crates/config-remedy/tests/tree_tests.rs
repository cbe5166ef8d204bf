//! Tree construction, traversal and query behavior

use config_remedy::{
    ConfigTree, Host, Options, Os, ROOT, TagFilter, TagRule, Test,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

fn host_a() -> Arc<Host> {
    Arc::new(Host::new("example1.rtr", Os::Ios, Options::default()))
}

fn host_b() -> Arc<Host> {
    Arc::new(Host::new("example2.rtr", Os::Ios, Options::default()))
}

#[test]
fn merge_concatenates_top_level_sections() {
    let mut hier1 = ConfigTree::new(host_a());
    hier1.add_child(ROOT, "interface Vlan2");
    let mut hier2 = ConfigTree::new(host_b());
    hier2.add_child(ROOT, "interface Vlan3");

    assert_eq!(1, hier1.all_children().count());
    assert_eq!(1, hier2.all_children().count());

    hier1.merge(&hier2);

    assert_eq!(2, hier1.all_children().count());

    // merging an empty tree changes nothing
    let before = hier1.clone();
    hier1.merge(&ConfigTree::new(host_b()));
    assert_eq!(before, hier1);
}

#[test]
fn merge_with_same_tree_content_merges_sections() {
    let mut hier1 = ConfigTree::new(host_a());
    let vlan = hier1.add_child(ROOT, "interface Vlan2");
    hier1.add_child(vlan, "description mgmt");
    let hier2 = hier1.clone();

    hier1.merge(&hier2);

    // sibling texts stay unique: same-text sections merge recursively
    assert_eq!(2, hier1.all_children().count());
}

#[test]
fn load_from_file() {
    let mut hier = ConfigTree::new(host_a());
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "interface Vlan2\n ip address 1.1.1.1 255.255.255.0").expect("write");

    hier.load_from_file(file.path()).expect("load");

    assert_eq!(2, hier.all_children().count());
}

#[test]
fn load_from_config_text() {
    let mut hier = ConfigTree::new(host_a());
    hier.load_from_string("interface Vlan2\n ip address 1.1.1.1 255.255.255.0")
        .expect("load");

    assert_eq!(2, hier.all_children().count());
}

#[test]
fn dump_and_load_from_dump_and_compare() {
    let mut pre_dump = ConfigTree::new(host_a());
    let a1 = pre_dump.add_child(ROOT, "a1");
    let b2 = pre_dump.add_child(a1, "b2");

    pre_dump.set_weight(b2, 400);
    pre_dump.append_tag(b2, "test");
    pre_dump.add_comment(b2, "test comment");
    pre_dump.set_new_in_config(b2, true);

    let dump = pre_dump.dump();

    let mut post_dump = ConfigTree::new(host_a());
    post_dump.load_from_dump(&dump).expect("load");

    assert_eq!(pre_dump, post_dump);
}

#[test]
fn add_tags_applies_lineage_rules() {
    let mut hier = ConfigTree::new(host_a());
    let rules: Vec<TagRule> =
        serde_yaml::from_str("- lineage:\n  - equals: interface Vlan2\n  add_tags: test")
            .expect("rules");
    let child = hier.add_child(ROOT, "interface Vlan2");

    hier.add_tags(&rules);

    assert_eq!(&BTreeSet::from(["test".to_string()]), hier.self_tags(child));
}

#[test]
fn all_children_sorted_with_lineage_rules_selects_sections() {
    let mut hier = ConfigTree::new(host_a());
    let svi = hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(svi, "description switch-mgmt-10.0.2.0/24");

    let mgmt = hier.add_child(ROOT, "interface FastEthernet0");
    hier.add_child(mgmt, "description mgmt-192.168.0.0/24");

    assert_eq!(4, hier.all_children().count());

    let rules: Vec<TagRule> =
        serde_yaml::from_str("- lineage:\n  - startswith: interface Vlan\n  add_tags: safe")
            .expect("rules");
    let selected = hier.all_children_sorted_with_lineage_rules(&rules);
    assert_eq!(2, selected.len());
    assert_eq!("interface Vlan2", hier.text(selected[0]));
}

#[test]
fn add_ancestor_copy_of_is_idempotent_within_a_tree() {
    let mut hier1 = ConfigTree::new(host_a());
    let interface = hier1.add_child(ROOT, "interface Vlan2");
    hier1.add_children(
        interface,
        ["description switch-mgmt-192.168.1.0/24", "ip address 192.168.1.0/24"],
    );

    hier1.add_ancestor_copy_within(interface);

    assert_eq!(3, hier1.all_children().count());
}

#[test]
fn has_children() {
    let mut hier = ConfigTree::new(host_a());
    assert!(!hier.has_children(ROOT));
    hier.add_child(ROOT, "interface Vlan2");
    assert!(hier.has_children(ROOT));
}

#[test]
fn depth_counts_ancestors() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    let ip_address = hier.add_child(interface, "ip address 192.168.1.1 255.255.255.0");
    assert_eq!(0, hier.depth(ROOT));
    assert_eq!(2, hier.depth(ip_address));
}

#[test]
fn get_child() {
    let mut hier = ConfigTree::new(host_a());
    hier.add_child(ROOT, "interface Vlan2");
    let child = hier
        .get_child(ROOT, &Test::equals("interface Vlan2"))
        .expect("child");
    assert_eq!("interface Vlan2", hier.text(child));
}

#[test]
fn get_child_deep() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(interface, "ip address 192.168.1.1 255.255.255.0");
    let child = hier.get_child_deep(
        ROOT,
        &[
            Test::equals("interface Vlan2"),
            Test::equals("ip address 192.168.1.1 255.255.255.0"),
        ],
    );
    assert!(child.is_some());
}

#[test]
fn get_children() {
    let mut hier = ConfigTree::new(host_a());
    hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(ROOT, "interface Vlan3");
    let children = hier.get_children(ROOT, &Test::startswith("interface"));
    assert_eq!(2, children.len());
}

#[test]
fn move_between_trees() {
    let mut hier1 = ConfigTree::new(host_a());
    let interface1 = hier1.add_child(ROOT, "interface Vlan2");
    hier1.add_child(interface1, "192.168.0.1/30");

    assert_eq!(2, hier1.all_children().count());

    let mut hier2 = ConfigTree::new(host_b());

    assert_eq!(0, hier2.all_children().count());

    hier1.move_to_tree(interface1, &mut hier2, ROOT);

    assert_eq!(0, hier1.all_children().count());
    assert_eq!(2, hier2.all_children().count());
}

#[test]
fn del_child_by_text() {
    let mut hier = ConfigTree::new(host_a());
    hier.add_child(ROOT, "interface Vlan2");
    hier.del_child_by_text(ROOT, "interface Vlan2");

    assert_eq!(0, hier.all_children().count());
    // absent text is a no-op
    hier.del_child_by_text(ROOT, "interface Vlan2");
}

#[test]
fn del_child() {
    let mut hier1 = ConfigTree::new(host_a());
    hier1.add_child(ROOT, "interface Vlan2");

    assert_eq!(1, hier1.all_children().count());

    let found = hier1
        .get_child(ROOT, &Test::startswith("interface"))
        .expect("child");
    hier1.del_child(found);

    assert_eq!(0, hier1.all_children().count());
}

#[test]
fn rebuild_children_index_preserves_structure() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    hier.add_children(
        interface,
        ["description switch-mgmt-192.168.1.0/24", "ip address 192.168.1.0/24"],
    );
    let before: Vec<String> = hier.all_children().map(|id| hier.text(id).to_string()).collect();

    hier.rebuild_children_index();

    let after: Vec<String> = hier.all_children().map(|id| hier.text(id).to_string()).collect();
    assert_eq!(before, after);
    assert!(hier.get_child(ROOT, &Test::equals("interface Vlan2")).is_some());
}

#[test]
fn add_children_takes_a_sequence() {
    let interface_items = ["description switch-mgmt 192.168.1.0/24", "ip address 192.168.1.1/24"];
    let mut hier1 = ConfigTree::new(host_a());
    let interface1 = hier1.add_child(ROOT, "interface Vlan2");
    hier1.add_children(interface1, interface_items);

    assert_eq!(3, hier1.all_children().count());

    // a single line is one child, never iterated per character
    let mut hier2 = ConfigTree::new(host_a());
    let interface2 = hier2.add_child(ROOT, "interface Vlan2");
    hier2.add_child(interface2, "description switch-mgmt 192.168.1.0/24");

    assert_eq!(2, hier2.all_children().count());
}

#[test]
fn add_child_returns_existing_on_collision() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    assert_eq!(1, hier.depth(interface));
    assert_eq!("interface Vlan2", hier.text(interface));

    let again = hier.add_child(ROOT, "interface Vlan2");
    assert_eq!(interface, again);
    assert_eq!(1, hier.all_children().count());
    assert_eq!(hier.instances(interface), ["interface Vlan2"]);
}

#[test]
fn add_deep_copy_of() {
    let mut hier1 = ConfigTree::new(host_a());
    let interface1 = hier1.add_child(ROOT, "interface Vlan2");
    hier1.add_children(
        interface1,
        ["description switch-mgmt-192.168.1.0/24", "ip address 192.168.1.0/24"],
    );

    let mut hier2 = ConfigTree::new(host_b());
    hier2.add_deep_copy_of(ROOT, &hier1, interface1);

    assert_eq!(3, hier2.all_children().count());
}

#[test]
fn cisco_style_text() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    let ip_address = hier.add_child(interface, "ip address 192.168.1.1 255.255.255.0");
    assert_eq!(
        "  ip address 192.168.1.1 255.255.255.0",
        hier.cisco_style_text(ip_address)
    );
    assert_ne!(
        " ip address 192.168.1.1 255.255.255.0",
        hier.cisco_style_text(ip_address)
    );
    assert_eq!("interface Vlan2", hier.cisco_style_text(interface));
}

#[test]
fn all_children_sorted_untagged() {
    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address_a = config.add_child(interface, "ip address 192.168.1.1/24");
    config.append_tag(ip_address_a, "a");
    let ip_address_none = config.add_child(interface, "ip address 192.168.2.1/24");

    let untagged = config.all_children_sorted_untagged();
    assert_eq!(2, untagged.len());
    assert_eq!(ip_address_none, untagged[1]);
    assert_eq!(interface, untagged[0]);
}

#[test]
fn all_children_sorted_by_tags() {
    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address_a = config.add_child(interface, "ip address 192.168.1.1/24");
    config.append_tag(ip_address_a, "a");
    let ip_address_ab = config.add_child(interface, "ip address 192.168.2.1/24");
    config.append_tags(ip_address_ab, ["a", "b"]);

    let a_not_b =
        config.all_children_sorted_by_tags(&TagFilter::from("a"), &TagFilter::from("b"));
    assert_eq!(2, a_not_b.len());
    assert_eq!(ip_address_a, a_not_b[1]);

    assert_eq!(
        3,
        config
            .all_children_sorted_by_tags(&TagFilter::from("a"), &TagFilter::from(""))
            .len()
    );
    assert_eq!(
        0,
        config
            .all_children_sorted_by_tags(&TagFilter::from(""), &TagFilter::from("a"))
            .len()
    );
    assert_eq!(
        3,
        config
            .all_children_sorted_by_tags(&TagFilter::from(""), &TagFilter::from(""))
            .len()
    );
}

#[test]
fn all_children_sorted() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(interface, "standby 1 ip 10.15.11.1");
    assert_eq!(2, hier.all_children_sorted().len());
}

#[test]
fn all_children() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(interface, "standby 1 ip 10.15.11.1");
    assert_eq!(2, hier.all_children().count());
}

#[test]
fn tags_report_upward_with_absence_sentinel() {
    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address = config.add_child(interface, "ip address 192.168.1.1/24");

    assert!(config.effective_tags(interface).untagged);
    assert!(config.effective_tags(ip_address).untagged);

    config.append_tag(ip_address, "a");
    assert!(config.effective_tags(interface).contains("a"));
    assert!(config.effective_tags(ip_address).contains("a"));
    assert!(!config.effective_tags(interface).contains("b"));
    assert!(!config.effective_tags(ip_address).contains("b"));
}

#[test]
fn append_tags_reaches_every_ancestor() {
    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address = config.add_child(interface, "ip address 192.168.1.1/24");
    config.append_tag(ip_address, "test_tag");
    assert!(config.effective_tags(ROOT).contains("test_tag"));
    assert!(config.effective_tags(interface).contains("test_tag"));
    assert!(config.effective_tags(ip_address).contains("test_tag"));
}

#[test]
fn remove_tags_clears_every_ancestor() {
    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address = config.add_child(interface, "ip address 192.168.1.1/24");
    config.append_tag(ip_address, "test_tag");
    assert!(config.effective_tags(ROOT).contains("test_tag"));
    config.remove_tag(ip_address, "test_tag");
    assert!(!config.effective_tags(ROOT).contains("test_tag"));
    assert!(!config.effective_tags(interface).contains("test_tag"));
    assert!(!config.effective_tags(ip_address).contains("test_tag"));
}

#[test]
fn negate_toggles() {
    let mut hier = ConfigTree::new(host_a());
    let interface = hier.add_child(ROOT, "interface Vlan2");
    hier.negate(interface);
    assert_eq!("no interface Vlan2", hier.text(interface));
    hier.negate(interface);
    assert_eq!("interface Vlan2", hier.text(interface));
}

#[test]
fn config_to_get_to() {
    let mut running = ConfigTree::new(host_a());
    let interface = running.add_child(ROOT, "interface Vlan2");
    running.add_child(interface, "ip address 192.168.1.1/24");
    let mut compiled = ConfigTree::new(host_a());
    compiled.add_child(ROOT, "interface Vlan3");

    let remediation = running.config_to_get_to(&compiled);
    assert_eq!(2, remediation.all_children().count());
    assert!(remediation.get_child(ROOT, &Test::equals("no interface Vlan2")).is_some());
    assert!(remediation.get_child(ROOT, &Test::equals("interface Vlan3")).is_some());
}

#[test]
fn line_inclusion_test() {
    let unconstrained = TagFilter::Unconstrained;
    let untagged = TagFilter::Untagged;

    let mut config = ConfigTree::new(host_a());
    let interface = config.add_child(ROOT, "interface Vlan2");
    let ip_address = config.add_child(interface, "ip address 192.168.1.1/24");
    let ip_address_a = config.add_child(interface, "ip address 192.168.2.1/24");
    config.append_tag(ip_address_a, "a");
    let ip_address_ab = config.add_child(interface, "ip address 192.168.3.1/24");
    config.append_tags(ip_address_ab, ["a", "b"]);

    assert!(config.line_inclusion_test(ip_address, &unconstrained, &unconstrained));
    assert!(config.line_inclusion_test(ip_address, &untagged, &unconstrained));
    assert!(!config.line_inclusion_test(ip_address, &unconstrained, &untagged));

    assert!(!config.line_inclusion_test(ip_address_a, &unconstrained, &TagFilter::from("a")));
    assert!(config.line_inclusion_test(ip_address_a, &TagFilter::from("a"), &unconstrained));
    assert!(config.line_inclusion_test(ip_address_a, &unconstrained, &unconstrained));
    assert!(!config.line_inclusion_test(ip_address_a, &untagged, &unconstrained));
    assert!(config.line_inclusion_test(ip_address_a, &unconstrained, &untagged));

    assert!(!config.line_inclusion_test(ip_address_ab, &TagFilter::from("a"), &TagFilter::from("b")));
    assert!(!config.line_inclusion_test(ip_address_ab, &unconstrained, &TagFilter::from("a")));
    assert!(config.line_inclusion_test(ip_address_ab, &TagFilter::from("a"), &unconstrained));
    assert!(config.line_inclusion_test(ip_address_ab, &unconstrained, &unconstrained));
    assert!(!config.line_inclusion_test(ip_address_ab, &untagged, &unconstrained));
    assert!(config.line_inclusion_test(ip_address_ab, &unconstrained, &untagged));
}

#[test]
fn difference() {
    let running = ["a", " a1", " a2", " a3", "b"];
    let step = ["a", " a1", " a2", " a3", " a4", " a5", "b", "c", "d", " d1"];
    let mut running_hier = ConfigTree::new(host_a());
    running_hier.load_from_string(&running.join("\n")).expect("running");
    let mut step_hier = ConfigTree::new(host_a());
    step_hier.load_from_string(&step.join("\n")).expect("step");

    let difference = step_hier.difference(&running_hier);
    let children: Vec<String> = difference
        .all_children_sorted()
        .into_iter()
        .map(|id| difference.cisco_style_text(id))
        .collect();
    assert_eq!(6, children.len());
    assert!(difference.get_child(ROOT, &Test::equals("c")).is_some());
    let d = difference.get_child(ROOT, &Test::equals("d")).expect("d");
    assert!(difference.get_child(d, &Test::equals("d1")).is_some());
    let a = difference.get_child(ROOT, &Test::equals("a")).expect("a");
    assert!(difference.get_child(a, &Test::equals("a4")).is_some());
    assert!(difference.get_child(a, &Test::equals("a5")).is_some());
}

#[test]
fn parent_allows_duplicate_child() {
    let options: Options = serde_yaml::from_str(
        r"
parent_allows_duplicate_child:
- lineage:
  - startswith: ip access-list
",
    )
    .expect("options");
    let host = Arc::new(Host::new("example1.rtr", Os::Ios, options));
    let mut hier = ConfigTree::new(Arc::clone(&host));

    let acl = hier.add_child(ROOT, "ip access-list standard MGMT");
    hier.add_child(acl, "permit 10.0.0.0 0.255.255.255");
    hier.add_child(acl, "permit 10.0.0.0 0.255.255.255");
    assert_eq!(2, hier.children(acl).len());

    // deduplication still applies where no rule matches
    let vlan = hier.add_child(ROOT, "interface Vlan2");
    hier.add_child(vlan, "description mgmt");
    hier.add_child(vlan, "description mgmt");
    assert_eq!(1, hier.children(vlan).len());
}
