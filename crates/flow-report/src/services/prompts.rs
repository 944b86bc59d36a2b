//! Section prompt templates
//!
//! Templates use MiniJinja syntax. Two filters are registered on top of the
//! builtins: `fixed` (two decimals) and `signed` (two decimals with sign).

use minijinja::Environment;
use serde::Serialize;

use crate::catalog::Section;
use crate::error::Result;

/// System prompt shared by every section
pub const SYSTEM_PROMPT: &str =
    "You are a professional crypto analyst who writes concise, data-driven market analysis.";

const MACRO_ANALYSIS: &str = r"You are a macro analyst writing the macro section of a weekly crypto market report.

Write 150-200 words based on the data below.

**US Dollar Index (DXY):**
- Current: {{ dxy_current | fixed }}
- Weekly change: {{ dxy_change | signed }}%

**US 10-Year Treasury Yield (US10Y):**
- Current: {{ us10y_current | fixed }}%
- Weekly change: {{ us10y_change | signed }} bps

**Equities:**
- S&P 500: {{ sp500_change | signed }}%
- NVDA: {{ nvda_change | signed }}%
- COIN: {{ coin_change | signed }}%

**Focus:**
1. How macro factors bear on the crypto market
2. Shifts in the dollar, rates and risk appetite
3. Keep it brief and professional

Output the analysis text only:
";

const BTC_ANALYSIS: &str = r"You are a professional crypto analyst writing the market section of a weekly BTC report.

Write 200-300 words based on the data below.

**Price:**
- Current price: ${{ current_price | fixed }}
- Weekly change: {{ weekly_change | signed }}%
- 30-day high: ${{ high_30d | fixed }}
- 30-day low: ${{ low_30d | fixed }}

**Technical indicators:**
{% for indicator in technical_indicators -%}
- {{ indicator.name }}: {% if indicator.value is none %}not enough data{% else %}{{ indicator.value | fixed }}{% endif %}
{% endfor %}
**Macro backdrop:**
{% if macro_context -%}
DXY: {{ macro_context.dxy if macro_context.dxy is not none else 'N/A' }}, US10Y: {{ macro_context.us10y if macro_context.us10y is not none else 'N/A' }}%
{%- else -%}
No macro data
{%- endif %}

**Requirements:**
1. At most three paragraphs
2. Data first, no speculation
3. Highlight key price levels and the trend
4. No emotional or one-sided wording

Output the analysis text only, without headings:
";

const ONCHAIN_ANALYSIS: &str = r"You are an on-chain analyst writing the BTC on-chain section of a weekly report.

Write 150-200 words based on the data below.

**Supply distribution (URPD):**
{{ urpd_summary }}

**ETF flows:**
{{ etf_summary }}

**Whale activity:**
{{ whale_summary }}

**Requirements:**
1. Explain what the on-chain data means for the market
2. Identify key support and resistance levels
3. Describe large-holder behaviour
4. Data first, no speculation

Output the analysis text only:
";

const SUMMARY: &str = r"You are a senior crypto analyst writing the summary of a weekly report.

Write 100-150 words based on this week's key data and analysis.

**Key data points:**
{% for metric in key_metrics -%}
- {{ metric }}
{% else -%}
- none
{% endfor %}
**Main observations:**
{% for observation in main_observations -%}
- {{ observation }}
{% else -%}
- none
{% endfor %}
**Requirements:**
1. Distil the two or three most important observations
2. Stay balanced, no one-sided forecasts
3. Give readers actionable insight
4. Be concise, avoid filler

Output the summary text only:
";

/// Compiled templates for every section
pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("fixed", |value: f64| format!("{value:.2}"));
        env.add_filter("signed", |value: f64| format!("{value:+.2}"));

        for (section, source) in [
            (Section::MacroAnalysis, MACRO_ANALYSIS),
            (Section::BtcAnalysis, BTC_ANALYSIS),
            (Section::OnchainAnalysis, ONCHAIN_ANALYSIS),
            (Section::Summary, SUMMARY),
        ] {
            env.add_template(section.as_str(), source)?;
        }

        Ok(Self { env })
    }

    /// Render the user prompt for `section`
    pub fn render<S: Serialize>(&self, section: Section, context: S) -> Result<String> {
        let template = self.env.get_template(section.as_str())?;
        Ok(template.render(context)?)
    }
}
