// Colored terminal output for feed posts and token launches.
//
// Everything user-facing that `watch`, `lookup`, `derive` and `deploy` print
// goes through here, so main.rs stays about control flow.

use colored::{Color, ColoredString, Colorize};

use super::{parse_hex_color, truncate_chars};
use crate::deploy::traits::{DeployRequest, DeployResult};
use crate::feed::model::{MediaKind, NotificationKind, Post};
use crate::token::identifier::TokenIdentifier;

/// Nested blocks are cut to this many characters.
const NESTED_PREVIEW_CHARS: usize = 160;

/// Display one post: header, body, media, then any nested post.
pub fn display_post(post: &Post) {
    let header = format!("{} @{}", post.author_display_name, post.author_handle);
    let header = highlight(&header, post.highlight_color.as_deref()).bold();
    let verified = if post.author_verified {
        " ✓".cyan().to_string()
    } else {
        String::new()
    };

    println!(
        "{}{} {}{}",
        header,
        verified,
        post.created_at.format("%H:%M:%S").to_string().dimmed(),
        classification_tags(post).dimmed(),
    );

    if let Some(kind) = post.notification {
        let label = match kind {
            NotificationKind::Follow => "follow",
            NotificationKind::Unfollow => "unfollow",
            NotificationKind::Deactivation => "deactivation",
        };
        println!(
            "  {} {}",
            format!("[{label}]").dimmed(),
            highlight(&post.body_text, post.highlight_color.as_deref())
        );
        println!();
        return;
    }

    if let Some(handle) = &post.reply_to_handle {
        println!("  {}", format!("replying to @{handle}").dimmed());
    }
    if let Some(replied) = &post.replied_to_post {
        display_nested(replied, "│");
    }

    if !post.body_text.is_empty() {
        for line in post.body_text.lines() {
            println!("  {line}");
        }
    }
    display_media(post, "  ");

    if let Some(embedded) = &post.embedded_post {
        display_nested(embedded, "┃");
    }

    if let Some(url) = post.external_url() {
        println!("  {}", url.dimmed());
    }
    println!();
}

fn display_nested(post: &Post, bar: &str) {
    let bar = bar.dimmed();
    println!(
        "  {} {}",
        bar,
        format!("{} @{}", post.author_display_name, post.author_handle).bold()
    );
    if !post.body_text.is_empty() {
        println!("  {} {}", bar, truncate_chars(&post.body_text, NESTED_PREVIEW_CHARS));
    }
    display_media(post, &format!("  {bar} "));
}

fn display_media(post: &Post, indent: &str) {
    for media in &post.media {
        let kind = match media.kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Gif => "gif",
        };
        println!("{indent}{} {}", format!("[{kind}]").yellow(), media.url.dimmed());
    }
}

fn classification_tags(post: &Post) -> String {
    let mut tags = Vec::new();
    if post.classification.is_retweet {
        tags.push("retweet");
    }
    if post.classification.is_quote {
        tags.push("quote");
    }
    if post.classification.is_reply {
        tags.push("reply");
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

/// Apply a `#rrggbb` highlight; unparseable colors are ignored.
fn highlight(text: &str, color: Option<&str>) -> ColoredString {
    match color.and_then(parse_hex_color) {
        Some((r, g, b)) => text.color(Color::TrueColor { r, g, b }),
        None => text.normal(),
    }
}

/// Display a derived token identifier.
pub fn display_identifier(identifier: &TokenIdentifier, mode: &str) {
    println!("  {:<8} {}", "Name".dimmed(), identifier.name.bold());
    println!("  {:<8} {}", "Symbol".dimmed(), identifier.symbol.bold().green());
    println!("  {:<8} {}", "Mode".dimmed(), mode);
}

/// Display a deploy request before it is sent.
pub fn display_deploy_request(request: &DeployRequest) {
    println!("{}", "=== Deploy ===".bold());
    println!("  {:<9} {}", "Platform".dimmed(), request.platform);
    println!("  {:<9} {}", "Name".dimmed(), request.name.bold());
    println!("  {:<9} {}", "Symbol".dimmed(), request.symbol.bold().green());
    println!("  {:<9} {}", "Image".dimmed(), request.image);
    println!("  {:<9} {} SOL", "Amount".dimmed(), request.amount);
    println!("  {:<9} {}", "Wallets".dimmed(), request.wallets.len());
    if let Some(website) = &request.website {
        println!("  {:<9} {}", "Website".dimmed(), website);
    }
    if let Some(twitter) = &request.twitter {
        println!("  {:<9} {}", "Twitter".dimmed(), twitter);
    }
}

/// Display a successful deploy.
pub fn display_deploy_result(result: &DeployResult) {
    println!("\n{} {}", "Deployed:".green().bold(), result.mint.bold());
    for signature in &result.signatures {
        println!("  {}", signature.dimmed());
    }
}
