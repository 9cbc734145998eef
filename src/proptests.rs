use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

type Model = BTreeMap<String, Vec<u32>>;

fn validate_tree(t: &TwoThreeIndex) {
    let Some(root) = t.root() else {
        assert_eq!(t.len(), 0, "empty tree must count no keys");
        assert_eq!(t.height(), 0);
        return;
    };

    let mut leaf_depth = None;
    let mut keys = 0usize;
    validate_node(root, None, None, 1, &mut leaf_depth, &mut keys);

    assert_eq!(keys, t.len(), "reachable key count must match len");
    assert_eq!(leaf_depth, Some(t.height()), "height must be the common leaf depth");

    let occurrences: usize = t.iter().map(|(_, lines)| lines.len()).sum();
    assert_eq!(
        occurrences,
        t.word_count(),
        "every word list pair must be recorded once in the tree"
    );
}

fn validate_node(
    node: &Node,
    lower: Option<&str>,
    upper: Option<&str>,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    keys: &mut usize,
) {
    let low = node.first_key();
    let high = node.second_key();
    *keys += node.key_count();

    assert!(!node.first_lines().is_empty(), "key {low:?} has no lines");
    if let Some(high) = high {
        assert!(low < high, "keys out of order: {low:?} !< {high:?}");
        assert!(node.second_lines().is_some_and(|l| !l.is_empty()));
    }
    let max = high.unwrap_or(low);
    if let Some(lower) = lower {
        assert!(lower < low, "{low:?} escapes lower bound {lower:?}");
    }
    if let Some(upper) = upper {
        assert!(max < upper, "{max:?} escapes upper bound {upper:?}");
    }

    if node.is_leaf() {
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(d) => assert_eq!(d, depth, "leaves at unequal depth"),
        }
        return;
    }

    assert_eq!(
        node.children().count(),
        node.key_count() + 1,
        "internal node must have one more child than keys"
    );
    let (Some(left), Some(middle)) = (node.left(), node.middle()) else {
        panic!("internal node missing left/middle child");
    };
    validate_node(left, lower, Some(low), depth + 1, leaf_depth, keys);
    match high {
        None => {
            assert!(node.right().is_none(), "2-node with a right child");
            validate_node(middle, Some(low), upper, depth + 1, leaf_depth, keys);
        }
        Some(high) => {
            let right = node.right().expect("3-node without a right child");
            validate_node(middle, Some(low), Some(high), depth + 1, leaf_depth, keys);
            validate_node(right, Some(high), upper, depth + 1, leaf_depth, keys);
        }
    }
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // Small alphabet so inserts collide with existing keys and deletes hit.
    "[a-f]{0,3}"
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 6)]
    Insert(
        #[proptest(strategy = "key_strategy()")] String,
        #[proptest(strategy = "1u32..200")] u32,
    ),
    #[proptest(weight = 1)]
    Delete(#[proptest(strategy = "key_strategy()")] String),
    #[proptest(weight = 3)]
    Search(#[proptest(strategy = "key_strategy()")] String),
}

fn pairs_strategy() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec((key_strategy(), 1u32..200), 1..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t = TwoThreeIndex::new();
        let mut m = Model::new();

        for op in ops {
            match op {
                Op::Insert(key, line) => {
                    let height_before = t.height();
                    let is_new = !m.contains_key(&key);
                    t.insert(&key, line).unwrap();
                    m.entry(key).or_default().push(line);

                    let height_after = t.height();
                    if is_new {
                        prop_assert!(height_after == height_before || height_after == height_before + 1);
                        if height_after > height_before {
                            // Only a root split adds a level, and it leaves a 2-node on top.
                            prop_assert!(!t.root().unwrap().is_three_node() || height_before == 0);
                        }
                    } else {
                        prop_assert_eq!(height_after, height_before);
                    }
                }
                Op::Delete(key) => {
                    let expected = match m.remove(&key) {
                        Some(_) => Ok(()),
                        None => Err(IndexError::not_found(key.as_str())),
                    };
                    prop_assert_eq!(t.delete(&key), expected);
                }
                Op::Search(key) => {
                    let got = t.search(&key).map(|lines| lines.to_vec()).ok();
                    prop_assert_eq!(got, m.get(&key).cloned());
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(String, Vec<u32>)> =
            t.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect();
        let expected: Vec<(String, Vec<u32>)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_delete_then_reinsert(pairs in pairs_strategy(), pick in any::<prop::sample::Index>(), line in 1u32..200) {
        let mut t = TwoThreeIndex::new();
        let mut m = Model::new();
        for (key, l) in &pairs {
            t.insert(key, *l).unwrap();
            m.entry(key.clone()).or_default().push(*l);
        }

        let victim = pairs[pick.index(pairs.len())].0.clone();
        t.delete(&victim).unwrap();
        validate_tree(&t);
        prop_assert!(t.get(&victim).is_none());

        t.insert(&victim, line).unwrap();
        m.insert(victim.clone(), vec![line]);
        validate_tree(&t);

        prop_assert_eq!(t.search(&victim).unwrap().as_slice(), &[line][..]);
        for (key, lines) in &m {
            prop_assert_eq!(t.search(key).unwrap().as_slice(), lines.as_slice());
        }
    }

    #[test]
    fn prop_traversals_visit_every_key(pairs in pairs_strategy()) {
        let mut t = TwoThreeIndex::new();
        let stats = t.extend_from(pairs.iter().map(|(k, l)| (k.as_str(), *l))).unwrap();
        validate_tree(&t);

        let non_empty = pairs.iter().filter(|(k, _)| !k.is_empty()).count();
        prop_assert_eq!(stats.total_words, non_empty);
        prop_assert_eq!(stats.distinct_words, t.len());
        prop_assert_eq!(stats.height, t.height());

        let sorted: Vec<&str> = t.traverse(Order::In).collect();
        prop_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(sorted.len(), t.len());

        for order in [Order::Pre, Order::Post] {
            let mut keys: Vec<&str> = t.traverse(order).collect();
            keys.sort_unstable();
            prop_assert_eq!(&keys, &sorted);
        }

        // Pre-order starts at the root, post-order ends there.
        if let Some(root) = t.root() {
            let root_keys: Vec<&str> =
                std::iter::once(root.first_key()).chain(root.second_key()).collect();
            let pre: Vec<&str> = t.traverse(Order::Pre).take(root_keys.len()).collect();
            prop_assert_eq!(&pre, &root_keys);
            let post: Vec<&str> = t.traverse(Order::Post).collect();
            prop_assert_eq!(&post[post.len() - root_keys.len()..], root_keys.as_slice());
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [&str; 7] = ["a", "b", "c", "aa", "ab", "ba", "bb"];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET[..], |perm| {
        let mut t = TwoThreeIndex::new();
        for (i, key) in perm.iter().enumerate() {
            t.insert(key, i as u32).unwrap();
            validate_tree(&t);
        }

        let mut expected = SMALL_SET.to_vec();
        expected.sort_unstable();
        let got: Vec<&str> = t.traverse(Order::In).collect();
        assert_eq!(got, expected, "insert order {perm:?}");
        for (i, key) in perm.iter().enumerate() {
            assert_eq!(t.search(key).unwrap(), &[i as u32]);
        }
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    // Insert in a fixed order, then delete in all permutations.
    let mut base = TwoThreeIndex::new();
    for (i, key) in SMALL_SET.iter().enumerate() {
        base.insert(key, i as u32).unwrap();
        base.insert(key, 100 + i as u32).unwrap();
    }

    for_each_permutation(&SMALL_SET[..], |perm| {
        let mut t = base.clone();
        let mut remaining: Vec<&str> = SMALL_SET.to_vec();

        for key in perm {
            t.delete(key).unwrap();
            remaining.retain(|k| *k != key);
            assert_eq!(t.len(), remaining.len());
            validate_tree(&t);
            for k in &remaining {
                let i = SMALL_SET.iter().position(|s| s == k).unwrap() as u32;
                assert_eq!(t.search(k).unwrap(), &[i, 100 + i]);
            }
        }
        assert!(t.is_empty());
        assert!(t.root().is_none());
        assert_eq!(t.word_count(), 0);
    });
}
