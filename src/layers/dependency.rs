//! Dependency ordering for effects in the same layer and sublayer.
//!
//! Effect A depends on effect B when applying B changes what A applies to.
//! Dependent effects apply after the effects they depend on; everything else
//! applies in timestamp order. The ready queue always takes the oldest effect
//! first, so an empty dependency graph yields plain timestamp order.
//!
//! A dependency cycle has no correct order. The whole group then falls back to
//! timestamp order and the cycle is reported to the caller.

use rustc_hash::FxHashSet;

/// Result of ordering one group of effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyOrder {
    /// Indices into the input slice, in application order.
    pub order: Vec<usize>,
    /// True if a cycle forced the timestamp fallback.
    pub cycle: bool,
}

/// Order `timestamps.len()` effects.
///
/// `depends_on(a, b)` answers whether effect `a` depends on effect `b`.
pub fn sort_with_dependencies(
    timestamps: &[u64],
    depends_on: impl Fn(usize, usize) -> bool,
) -> DependencyOrder {
    let n = timestamps.len();
    let by_timestamp = || {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| (timestamps[i], i));
        order
    };

    if n <= 1 {
        return DependencyOrder {
            order: (0..n).collect(),
            cycle: false,
        };
    }

    let mut dependencies: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); n];
    let mut has_any_dependency = false;
    for (a, deps) in dependencies.iter_mut().enumerate() {
        for b in 0..n {
            if a != b && depends_on(a, b) {
                deps.insert(b);
                has_any_dependency = true;
            }
        }
    }

    if !has_any_dependency {
        return DependencyOrder {
            order: by_timestamp(),
            cycle: false,
        };
    }

    if has_cycle(&dependencies) {
        return DependencyOrder {
            order: by_timestamp(),
            cycle: true,
        };
    }

    let mut in_degree: Vec<usize> = dependencies.iter().map(FxHashSet::len).collect();
    let mut depended_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, deps) in dependencies.iter().enumerate() {
        for &b in deps {
            depended_by[b].push(a);
        }
    }

    let newest_last = |ready: &mut Vec<usize>| {
        ready.sort_by_key(|&i| std::cmp::Reverse((timestamps[i], i)));
    };

    let mut order = Vec::with_capacity(n);
    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    newest_last(&mut ready);

    while let Some(next) = ready.pop() {
        order.push(next);
        for &dependent in &depended_by[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
        newest_last(&mut ready);
    }

    DependencyOrder { order, cycle: false }
}

/// Check if the dependency graph has a cycle.
fn has_cycle(dependencies: &[FxHashSet<usize>]) -> bool {
    fn dfs(node: usize, dependencies: &[FxHashSet<usize>], visited: &mut [bool], in_stack: &mut [bool]) -> bool {
        visited[node] = true;
        in_stack[node] = true;

        for &dep in &dependencies[node] {
            if !visited[dep] {
                if dfs(dep, dependencies, visited, in_stack) {
                    return true;
                }
            } else if in_stack[dep] {
                return true;
            }
        }

        in_stack[node] = false;
        false
    }

    let n = dependencies.len();
    let mut visited = vec![false; n];
    let mut in_stack = vec![false; n];
    (0..n).any(|i| !visited[i] && dfs(i, dependencies, &mut visited, &mut in_stack))
}
