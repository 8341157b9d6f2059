//! Route trie construction and lookup.
//!
//! # Responsibilities
//! - Store handler bindings in a path-segment trie
//! - Resolve request paths to a node plus captured parameters
//! - Render the tree for startup diagnostics
//!
//! # Design Decisions
//! - Built during startup, shared read-only behind an `Arc` while serving
//! - Literal children win over the parameter child at every depth
//! - No backtracking: a literal match that dead-ends deeper is a miss
//! - Lookup cost is proportional to path depth, not route count

use std::collections::HashMap;
use std::fmt;

use futures_util::future::BoxFuture;

use crate::http::method::{Method, METHOD_COUNT};
use crate::http::response::HttpResponse;
use crate::routing::group::RouteGroup;
use crate::routing::handler::{MiddlewareFn, RouteHandler, RouteRequest};
use crate::routing::matcher::{join_path, path_segments, Segment};

/// One node of the trie.
pub struct RouteNode<S, D> {
    segment: Segment,
    bindings: [Option<RouteHandler<S, D>>; METHOD_COUNT],
    literals: HashMap<String, RouteNode<S, D>>,
    param: Option<Box<RouteNode<S, D>>>,
}

impl<S, D> RouteNode<S, D> {
    fn new(segment: Segment) -> Self {
        Self {
            segment,
            bindings: std::array::from_fn(|_| None),
            literals: HashMap::new(),
            param: None,
        }
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Binding for `method`, if one was registered on this node.
    pub fn binding(&self, method: Method) -> Option<&RouteHandler<S, D>> {
        method.index().and_then(|i| self.bindings[i].as_ref())
    }

    /// Methods bound on this node, in table order.
    pub fn methods(&self) -> Vec<Method> {
        Method::ALL
            .iter()
            .copied()
            .filter(|m| self.binding(*m).is_some())
            .collect()
    }

    fn child_or_insert(&mut self, raw: &str) -> &mut RouteNode<S, D> {
        match Segment::parse(raw) {
            Segment::Literal(text) => self
                .literals
                .entry(text.clone())
                .or_insert_with(|| RouteNode::new(Segment::Literal(text))),
            Segment::Param(name) => {
                if let Some(existing) = &self.param {
                    if existing.segment != Segment::Param(name.clone()) {
                        tracing::warn!(
                            existing = %existing.segment,
                            ignored = %Segment::Param(name.clone()),
                            "Parameter segment already registered at this depth; keeping existing name"
                        );
                    }
                }
                self.param
                    .get_or_insert_with(|| Box::new(RouteNode::new(Segment::Param(name))))
                    .as_mut()
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let methods: Vec<&str> = self.methods().iter().map(|m| m.as_str()).collect();
        writeln!(
            f,
            "{:indent$}/{} [{}]",
            "",
            self.segment,
            methods.join(", "),
            indent = depth * 2
        )?;

        let mut keys: Vec<&String> = self.literals.keys().collect();
        keys.sort();
        for key in keys {
            self.literals[key].render(f, depth + 1)?;
        }
        if let Some(param) = &self.param {
            param.render(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Result of a successful lookup.
pub struct RouteMatch<'r, S, D> {
    pub node: &'r RouteNode<S, D>,
    pub params: HashMap<String, String>,
}

impl<'r, S, D> RouteMatch<'r, S, D> {
    pub fn binding(&self, method: Method) -> Option<&'r RouteHandler<S, D>> {
        self.node.binding(method)
    }
}

/// The full set of registered routes.
pub struct RouteCollection<S, D> {
    root: RouteNode<S, D>,
    bindings: usize,
}

impl<S, D> Default for RouteCollection<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> RouteCollection<S, D> {
    pub fn new() -> Self {
        Self {
            root: RouteNode::new(Segment::Literal(String::new())),
            bindings: 0,
        }
    }

    /// Number of (node, method) bindings.
    pub fn len(&self) -> usize {
        self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings == 0
    }

    /// Bind a handler without middleware.
    pub fn add_route<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route_with_middleware(method, path, handler, Vec::new());
    }

    /// Bind a handler with middleware run in order before it.
    pub fn add_route_with_middleware<F>(
        &mut self,
        method: Method,
        path: &str,
        handler: F,
        middleware: Vec<MiddlewareFn<S, D>>,
    ) where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.bind(
            method,
            path,
            RouteHandler {
                handler: std::sync::Arc::new(handler),
                middleware,
            },
        );
    }

    /// Bind an already boxed handler. Re-binding the same (path, method) replaces it.
    pub fn bind(&mut self, method: Method, path: &str, binding: RouteHandler<S, D>) {
        let Some(slot) = method.index() else {
            tracing::warn!(path = %path, "Ignoring route registered for unknown method");
            return;
        };

        let mut node = &mut self.root;
        for raw in path_segments(path) {
            node = node.child_or_insert(raw);
        }
        if node.bindings[slot].replace(binding).is_none() {
            self.bindings += 1;
        }
    }

    pub fn get<F>(&mut self, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route(Method::Get, path, handler);
    }

    pub fn post<F>(&mut self, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route(Method::Post, path, handler);
    }

    pub fn put<F>(&mut self, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route(Method::Put, path, handler);
    }

    pub fn patch<F>(&mut self, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route(Method::Patch, path, handler);
    }

    pub fn delete<F>(&mut self, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.add_route(Method::Delete, path, handler);
    }

    /// Mount every route of `group` under `prefix`.
    pub fn add_group(&mut self, prefix: &str, group: RouteGroup<S, D>) {
        for route in group.into_routes() {
            let path = join_path(prefix, &route.path);
            self.bind(route.method, &path, route.binding);
        }
    }

    /// Resolve a request path. Never mutates the trie.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_, S, D>> {
        let mut node = &self.root;
        let mut params = HashMap::new();

        for segment in path_segments(path) {
            node = match node.literals.get(segment) {
                Some(child) => child,
                None => {
                    let child = node.param.as_deref()?;
                    if let Segment::Param(name) = &child.segment {
                        params.insert(name.clone(), segment.to_string());
                    }
                    child
                }
            };
        }

        Some(RouteMatch { node, params })
    }
}

impl<S, D> fmt::Display for RouteCollection<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}
