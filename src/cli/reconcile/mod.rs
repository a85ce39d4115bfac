//! Reconcile command - repairs like counters after partial writes

use tracing::info;

use crate::infrastructure::services::LikeService;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let backends = crate::create_backends(&config).await?;

    let likes = LikeService::new(backends.posts, backends.users);
    let report = likes.reconcile().await?;

    info!(
        checked = report.checked,
        corrected = report.corrected,
        pruned_users = report.pruned_users,
        "Like counters reconciled"
    );
    println!(
        "checked {} posts, corrected {} counters, pruned likes for {} users",
        report.checked, report.corrected, report.pruned_users
    );

    Ok(())
}
