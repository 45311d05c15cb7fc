//! Extraction prompts for the Pyth actions.

pub const PRICE_FEEDS: &str = r#"
Extract the following parameters for searching Pyth price feeds:
- **query** (string, optional): Text to match against feed symbols (e.g., "btc", "eth/usd")
- **asset_type** (string, optional): One of "crypto", "equity", "fx", "metal", "rates"
- **limit** (number): How many feeds to list, between 1 and 50 - defaults to 10

Provide the values in the following JSON format:

```json
{
    "query": "btc",
    "asset_type": "crypto",
    "limit": 10
}
```

Example request: "What Pyth feeds are there for gold?"
Example response:
```json
{
    "query": "xau",
    "asset_type": "metal",
    "limit": 10
}
```

Here are the recent user messages for context:
{{recentMessages}}

Based on the conversation above, if the request is about finding Pyth price feeds, extract the appropriate parameters and respond with a JSON object. If the request is not related to Pyth price feeds, respond with null."#;

pub const LATEST_PRICE_UPDATES: &str = r#"
Extract the following parameters for the latest Pyth price updates:
- **price_ids** (string | string[]): One or more 32-byte hex price feed ids, with or without the 0x prefix

Provide the values in the following JSON format:

```json
{
    "price_ids": ["0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43"]
}
```

Here are the recent user messages for context:
{{recentMessages}}

Based on the conversation above, if the request asks for current Pyth prices of specific feed ids, extract them and respond with a JSON object. If no feed ids are given or the request is unrelated, respond with null."#;

pub const PRICE_UPDATES_STREAM: &str = r#"
Extract the following parameters for streaming Pyth price updates:
- **price_ids** (string | string[]): One or more 32-byte hex price feed ids, with or without the 0x prefix
- **max_updates** (number): How many updates to collect, between 1 and 20 - defaults to 5

Provide the values in the following JSON format:

```json
{
    "price_ids": ["0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace"],
    "max_updates": 5
}
```

Here are the recent user messages for context:
{{recentMessages}}

Based on the conversation above, if the request asks to watch or stream Pyth prices for specific feed ids, extract the appropriate parameters and respond with a JSON object. If the request is unrelated, respond with null."#;
