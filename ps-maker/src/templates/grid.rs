//! Embedded grid templates
//!
//! Handlebars sources for every generated file. Twig expressions in the view
//! are written as `\{{` so handlebars leaves them alone.

/// Grid definition factory class
pub const DEFINITION_FACTORY_TEMPLATE: &str = r"<?php

declare(strict_types=1);

namespace {{namespace}};

use PrestaShop\PrestaShop\Core\Grid\Column\ColumnCollection;
use PrestaShop\PrestaShop\Core\Grid\Column\ColumnCollectionInterface;
use PrestaShop\PrestaShop\Core\Grid\Column\Type\DataColumn;
use PrestaShop\PrestaShop\Core\Grid\Definition\Factory\AbstractGridDefinitionFactory;
use PrestaShop\PrestaShop\Core\Grid\Filter\FilterCollection;
use PrestaShop\PrestaShop\Core\Grid\Filter\FilterCollectionInterface;

final class {{class_name}} extends AbstractGridDefinitionFactory
{
    public const GRID_ID = '{{grid_id}}';

    protected function getId(): string
    {
        return self::GRID_ID;
    }

    protected function getName(): string
    {
        return $this->trans('{{grid_name}}', [], '{{translation_domain}}');
    }

    protected function getColumns(): ColumnCollectionInterface
    {
        return (new ColumnCollection())
{{#each columns}}
            ->add((new DataColumn('{{field}}'))
                ->setName($this->trans('{{title}}', [], '{{../translation_domain}}'))
                ->setOptions([
                    'field' => '{{field}}',
                ])
            )
{{/each}}
        ;
    }

    protected function getFilters(): FilterCollectionInterface
    {
        return new FilterCollection();
    }
}
";

/// Search filters class
pub const FILTERS_TEMPLATE: &str = r"<?php

declare(strict_types=1);

namespace {{namespace}};

use {{definition_factory_class}};
use PrestaShop\PrestaShop\Core\Search\Filters;

final class {{class_name}} extends Filters
{
    protected $filterId = {{definition_factory_name}}::GRID_ID;

    /**
     * {@inheritdoc}
     */
    public static function getDefaults()
    {
        return [
            'limit' => 10,
            'offset' => 0,
            'orderBy' => '{{primary_key}}',
            'sortOrder' => 'asc',
            'filters' => [],
        ];
    }
}
";

/// Doctrine query builder class
pub const QUERY_BUILDER_TEMPLATE: &str = r"<?php

declare(strict_types=1);

namespace {{namespace}};

use Doctrine\DBAL\Connection;
use Doctrine\DBAL\Query\QueryBuilder;
use PrestaShop\PrestaShop\Core\Grid\Query\AbstractDoctrineQueryBuilder;
use PrestaShop\PrestaShop\Core\Grid\Search\SearchCriteriaInterface;

final class {{class_name}} extends AbstractDoctrineQueryBuilder
{
    /**
     * @var int
     */
    private $contextLangId;

    /**
     * @var int
     */
    private $contextShopId;

    public function __construct(Connection $connection, string $dbPrefix, int $contextLangId, int $contextShopId)
    {
        parent::__construct($connection, $dbPrefix);

        $this->contextLangId = $contextLangId;
        $this->contextShopId = $contextShopId;
    }

    public function getSearchQueryBuilder(SearchCriteriaInterface $searchCriteria): QueryBuilder
    {
        $qb = $this->getQueryBuilder($searchCriteria->getFilters());
        $qb->select('{{select_statement}}')
            ->orderBy($searchCriteria->getOrderBy(), $searchCriteria->getOrderWay())
            ->setFirstResult($searchCriteria->getOffset())
            ->setMaxResults($searchCriteria->getLimit());

        return $qb;
    }

    public function getCountQueryBuilder(SearchCriteriaInterface $searchCriteria): QueryBuilder
    {
        $qb = $this->getQueryBuilder($searchCriteria->getFilters());
        $qb->select('COUNT({{table_alias}}.{{primary_key}})');

        return $qb;
    }

    private function getQueryBuilder(array $filters): QueryBuilder
    {
        $qb = $this->connection
            ->createQueryBuilder()
            ->from($this->dbPrefix . '{{table_name}}', '{{table_alias}}');

        foreach ($filters as $name => $value) {
            $qb->andWhere('{{table_alias}}.`' . $name . '` LIKE :' . $name)
                ->setParameter($name, '%' . $value . '%');
        }

        return $qb;
    }
}
";

/// Empty admin controller, the index action is appended afterwards
pub const CONTROLLER_TEMPLATE: &str = r"<?php

declare(strict_types=1);

namespace {{namespace}};

use PrestaShopBundle\Controller\Admin\FrameworkBundleAdminController;

class {{class_name}} extends FrameworkBundleAdminController
{
}
";

/// Index action member, appended to new or existing controllers
pub const INDEX_ACTION_TEMPLATE: &str = r"    /**
     * Lists {{grid_name_lower}} in a grid.
     */
    public function {{action_name}}({{filters_type}} $filters): {{response_type}}
    {
        $gridFactory = $this->get('{{grid_factory_service}}');
        $grid = $gridFactory->getGrid($filters);

        return $this->render('{{view_reference}}', [
            'enableSidebar' => true,
            'layoutTitle' => $this->trans('{{grid_name}}', '{{translation_domain}}'),
            'grid' => $this->presentGrid($grid),
        ]);
    }";

/// Grid index view
pub const INDEX_VIEW_TEMPLATE: &str = r"{% extends '@PrestaShop/Admin/layout.html.twig' %}

{% block content %}
  <div class='row'>
    <div class='col'>
      \{{ include('@PrestaShop/Admin/Common/Grid/grid_panel.html.twig', {'grid': grid}) }}
    </div>
  </div>
{% endblock %}

{% block javascripts %}
  \{{ parent() }}

  <script src='\{{ asset('themes/new-theme/public/{{grid_id}}.bundle.js') }}'></script>
{% endblock %}
";
