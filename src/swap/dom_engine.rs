//! Default swap engine over the in-crate document arena.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::{SwapEngine, SwapError, SwapHandle, SwapJob, SwapStyle};
use crate::dom::parse::parse_into;
use crate::dom::tree::{NodeId, Tree};
use crate::dom::Document;

/// Applies swaps directly to a shared [`Document`].
///
/// With no timing modifiers the mutation is applied synchronously and both
/// signals resolve immediately; a swap or settle delay moves the work onto a
/// spawned task.
pub struct DomSwapEngine {
    document: Arc<Document>,
}

impl DomSwapEngine {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }
}

impl SwapEngine for DomSwapEngine {
    fn swap(&self, job: SwapJob) -> SwapHandle {
        let (applied_tx, applied_rx) = oneshot::channel();
        let (settled_tx, settled_rx) = oneshot::channel();
        let handle = SwapHandle {
            applied: applied_rx,
            settled: settled_rx,
        };

        if job.spec.swap_delay.is_zero() && job.spec.settle_delay.is_zero() {
            let result = self
                .document
                .with_tree(|tree| apply_swap(tree, job.target, &job.content, job.spec.style));
            let ok = result.is_ok();
            let _ = applied_tx.send(result);
            if ok {
                let _ = settled_tx.send(());
            }
            return handle;
        }

        let document = self.document.clone();
        tokio::spawn(async move {
            if !job.spec.swap_delay.is_zero() {
                tokio::time::sleep(job.spec.swap_delay).await;
            }
            let result =
                document.with_tree(|tree| apply_swap(tree, job.target, &job.content, job.spec.style));
            let ok = result.is_ok();
            let _ = applied_tx.send(result);
            if !ok {
                return;
            }
            if !job.spec.settle_delay.is_zero() {
                tokio::time::sleep(job.spec.settle_delay).await;
            }
            let _ = settled_tx.send(());
        });

        handle
    }
}

fn apply_swap(
    tree: &mut Tree,
    target: NodeId,
    content: &str,
    style: SwapStyle,
) -> Result<(), SwapError> {
    if style == SwapStyle::None {
        return Ok(());
    }
    if !tree.is_attached(target) {
        return Err(SwapError::TargetDetached);
    }
    if style == SwapStyle::Delete {
        tree.detach(target);
        return Ok(());
    }

    let staging = tree.create_fragment();
    let fragment = parse_into(tree, staging, content)
        .map_err(|e| SwapError::Parse(e.to_string()))?;

    match style {
        SwapStyle::InnerHtml => {
            tree.clear_children(target);
            for node in fragment {
                tree.append(target, node);
            }
        }
        SwapStyle::BeforeEnd => {
            for node in fragment {
                tree.append(target, node);
            }
        }
        SwapStyle::AfterBegin => {
            for (offset, node) in fragment.into_iter().enumerate() {
                tree.attach(target, offset, node);
            }
        }
        SwapStyle::OuterHtml => {
            let parent = tree.parent(target).ok_or(SwapError::TargetDetached)?;
            let position = tree
                .child_position(parent, target)
                .ok_or(SwapError::TargetDetached)?;
            tree.detach(target);
            for (offset, node) in fragment.into_iter().enumerate() {
                tree.attach(parent, position + offset, node);
            }
        }
        SwapStyle::BeforeBegin => {
            let parent = tree.parent(target).ok_or(SwapError::TargetDetached)?;
            let position = tree
                .child_position(parent, target)
                .ok_or(SwapError::TargetDetached)?;
            for (offset, node) in fragment.into_iter().enumerate() {
                tree.attach(parent, position + offset, node);
            }
        }
        SwapStyle::AfterEnd => {
            let parent = tree.parent(target).ok_or(SwapError::TargetDetached)?;
            let position = tree
                .child_position(parent, target)
                .ok_or(SwapError::TargetDetached)?;
            for (offset, node) in fragment.into_iter().enumerate() {
                tree.attach(parent, position + 1 + offset, node);
            }
        }
        SwapStyle::Delete | SwapStyle::None => unreachable!("handled above"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::SwapSpec;
    use std::time::Duration;

    fn doc(html: &str) -> Arc<Document> {
        Arc::new(Document::from_html(html).unwrap())
    }

    fn job(target: NodeId, content: &str, style: SwapStyle) -> SwapJob {
        SwapJob {
            target,
            content: content.to_string(),
            spec: SwapSpec {
                style,
                ..SwapSpec::default()
            },
        }
    }

    async fn run_swap(document: &Arc<Document>, j: SwapJob) {
        let engine = DomSwapEngine::new(document.clone());
        let handle = engine.swap(j);
        handle.applied.await.unwrap().unwrap();
        handle.settled.await.unwrap();
    }

    #[tokio::test]
    async fn test_outer_html_replaces_element() {
        let document = doc("<div id=\"t\">Old</div>");
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "<div id=\"t\">Hi</div>", SwapStyle::OuterHtml)).await;

        let replacement = document.query("#t").unwrap();
        assert_ne!(replacement, target);
        assert_eq!(document.text_content(replacement), "Hi");
        assert!(!document.contains(target));
    }

    #[tokio::test]
    async fn test_inner_html_replaces_children() {
        let document = doc("<div id=\"t\"><span>Old</span></div>");
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "<em>New</em>", SwapStyle::InnerHtml)).await;

        assert!(document.contains(target));
        assert_eq!(document.text_content(target), "New");
        assert_eq!(document.html(), "<div id=\"t\"><em>New</em></div>");
    }

    #[tokio::test]
    async fn test_adjacent_positions() {
        let document = doc("<div id=\"t\">mid</div>");
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "<i>a</i>", SwapStyle::BeforeBegin)).await;
        run_swap(&document, job(target, "<i>z</i>", SwapStyle::AfterEnd)).await;
        run_swap(&document, job(target, "<b>1</b>", SwapStyle::AfterBegin)).await;
        run_swap(&document, job(target, "<b>9</b>", SwapStyle::BeforeEnd)).await;

        assert_eq!(
            document.html(),
            "<i>a</i><div id=\"t\"><b>1</b>mid<b>9</b></div><i>z</i>"
        );
    }

    #[tokio::test]
    async fn test_delete_detaches_target() {
        let document = doc("<div id=\"t\">x</div><p>keep</p>");
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "", SwapStyle::Delete)).await;
        assert!(document.query("#t").is_none());
        assert_eq!(document.html(), "<p>keep</p>");
    }

    #[tokio::test]
    async fn test_none_leaves_document_unchanged() {
        let document = doc("<div id=\"t\">x</div>");
        let before = document.html();
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "<p>ignored</p>", SwapStyle::None)).await;
        assert_eq!(document.html(), before);
    }

    #[tokio::test]
    async fn test_detached_target_fails_applied_signal() {
        let document = doc("<div id=\"t\">x</div>");
        let target = document.query("#t").unwrap();
        document.with_tree(|tree| tree.detach(target));

        let engine = DomSwapEngine::new(document.clone());
        let handle = engine.swap(job(target, "<p>y</p>", SwapStyle::InnerHtml));
        let applied = handle.applied.await.unwrap();
        assert!(matches!(applied, Err(SwapError::TargetDetached)));
        // settled sender dropped on failure
        assert!(handle.settled.await.is_err());
    }

    #[tokio::test]
    async fn test_multi_root_outer_swap() {
        let document = doc("<p>a</p><div id=\"t\">x</div><p>b</p>");
        let target = document.query("#t").unwrap();
        run_swap(&document, job(target, "<span>1</span><span>2</span>", SwapStyle::OuterHtml)).await;
        assert_eq!(
            document.html(),
            "<p>a</p><span>1</span><span>2</span><p>b</p>"
        );
    }

    #[tokio::test]
    async fn test_settle_delay_orders_signals() {
        let document = doc("<div id=\"t\">x</div>");
        let target = document.query("#t").unwrap();
        let engine = DomSwapEngine::new(document.clone());

        let mut j = job(target, "<b>y</b>", SwapStyle::InnerHtml);
        j.spec.settle_delay = Duration::from_millis(50);
        let handle = engine.swap(j);

        handle.applied.await.unwrap().unwrap();
        // mutation visible at the applied point, before settle
        assert_eq!(document.text_content(target), "y");
        handle.settled.await.unwrap();
    }
}
