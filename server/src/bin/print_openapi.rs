use eyre::{Context, Result};
use utoipa::OpenApi;

use picstash::openapi;

fn to_camel_case(s: &str) -> String {
    let mut cs = String::with_capacity(s.len());
    let mut it = s.chars().peekable();
    while let Some(c) = it.next() {
        match (c, it.peek()) {
            ('_', Some(nc)) if *nc != '_' => {
                cs.push(nc.to_ascii_uppercase());
                let _ = it.next();
            }
            (c, _) => cs.push(c),
        }
    }
    cs
}

fn main() -> Result<()> {
    let mut oapi: utoipa::openapi::OpenApi = openapi::ApiDoc::openapi();
    // operationIds are the handler names
    oapi.paths.paths.iter_mut().for_each(|(_path, path_item)| {
        path_item.operations.iter_mut().for_each(|(_, op)| {
            op.operation_id = op.operation_id.as_ref().map(|name| to_camel_case(name));
        });
    });
    println!(
        "{}",
        oapi.to_pretty_json()
            .wrap_err("error serializing OpenAPI document")?
    );
    Ok(())
}
