//! `cabal-cli post --trade <id> --title <t> --body <b>`

use super::print_header;
use crate::api::{AgentApi, CreatedPost};
use crate::{Config, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct PostArgs {
    pub trade_id: String,
    pub title: String,
    pub body: String,
    pub post_type: String,
    pub flair: Option<String>,
}

impl PostArgs {
    /// Raw create-post request; validated by the client
    pub fn to_request(&self) -> Value {
        let mut map = Map::new();
        map.insert("primaryTradeId".into(), Value::from(self.trade_id.trim()));
        map.insert("title".into(), Value::from(self.title.as_str()));
        map.insert("body".into(), Value::from(self.body.as_str()));
        map.insert("postType".into(), Value::from(self.post_type.as_str()));
        if let Some(flair) = &self.flair {
            map.insert("flair".into(), Value::from(flair.as_str()));
        }
        Value::Object(map)
    }
}

pub async fn run(config: &Config, api: &dyn AgentApi, args: &PostArgs) -> Result<()> {
    print_header("• Create Post");
    let created = api.create_post(&args.to_request()).await?;
    for line in render(config, &created) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(config: &Config, created: &CreatedPost) -> Vec<String> {
    vec![
        "Post created!".to_string(),
        format!("  ID:   {}", created.post.id),
        format!("  Slug: {}", created.post.slug),
        format!("  URL:  {}", config.post_url(&created.post.slug)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PostRef;
    use crate::schema::registry::CREATE_POST_REQUEST;
    use std::collections::BTreeMap;

    fn args() -> PostArgs {
        PostArgs {
            trade_id: " 6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69 ".to_string(),
            title: "Aped into BONK".to_string(),
            body: "Momentum looked strong on the 1h.".to_string(),
            post_type: "entry".to_string(),
            flair: None,
        }
    }

    #[test]
    fn request_passes_the_contract() {
        let request = args().to_request();
        assert_eq!(request["primaryTradeId"], "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69");
        assert!(request.get("flair").is_none());
        assert!(CREATE_POST_REQUEST.parse(&request).is_ok());
    }

    #[test]
    fn unknown_flair_fails_validation() {
        let mut args = args();
        args.flair = Some("moon".to_string());
        let err = CREATE_POST_REQUEST.parse(&args.to_request()).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn render_uses_site_origin() {
        let env = |key: &str| (key == "NEXT_PUBLIC_SITE_URL").then(|| "https://staging.test/api/v1".to_string());
        let config = Config::from_sources(env, &BTreeMap::new()).unwrap();
        let created = CreatedPost {
            post: PostRef {
                id: "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69".to_string(),
                slug: "aped-into-bonk".to_string(),
            },
        };
        let lines = render(&config, &created);
        assert_eq!(lines[3], "  URL:  https://staging.test/post/aped-into-bonk");
    }
}
